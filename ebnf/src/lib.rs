//! EBNF grammar notation, and installing parsed grammars as `descent` rules.
//!
//! Supported notation: `name = rhs ;` productions with `|` alternation, `,`
//! concatenation, `-` exception, `[ ]` optional, `{ }` repetition, `( )`
//! grouping, quoted terminals, `"a" .. "z"` character ranges and `(* *)`
//! comments.

use std::fmt::{self, Display};
use std::str::FromStr;

use descent::{RuleId, Rules};

mod error;
pub use error::Error;
mod parser;

/// A constant identifying production rules.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Identifier(pub String);

impl Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A literal string.
///
/// Terminals are quoted with `"` unless they contain one, in which case `'`
/// is used. A terminal containing both quote characters can't be written in
/// EBNF, so its text form won't parse back.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Terminal(pub String);

impl Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.contains('"') {
            write!(f, "'{}'", self.0)
        } else {
            write!(f, "\"{}\"", self.0)
        }
    }
}

impl From<&str> for Terminal {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// The lhs of a production rule.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Lhs(pub Identifier);

impl From<&str> for Lhs {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl Display for Lhs {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The rhs of a production rule.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Rhs {
    Identifier(Identifier),
    Terminal(Terminal),
    /// A single character within an inclusive range.
    Range(char, char),
    Optional(Box<Rhs>),
    Repeat(Box<Rhs>),
    Group(Box<Rhs>),
    Exception(Box<Rhs>, Box<Rhs>),
    Alternation(Box<Rhs>, Box<Rhs>),
    Concatenation(Box<Rhs>, Box<Rhs>),
}

/// How concatenated items are joined when building rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Join {
    /// Items must be directly adjacent.
    Adjacent,
    /// Whitespace is allowed between items.
    Spaced,
}

impl Rhs {
    /// Build rules matching this rhs. Identifiers become named references,
    /// resolved when the rules are evaluated.
    pub fn build<S>(&self, rules: &mut Rules<S>, join: Join) -> RuleId {
        match self {
            Rhs::Identifier(iden) => rules.named(&iden.0),
            Rhs::Terminal(term) => rules.literal(&term.0),
            Rhs::Range(lo, hi) => rules.range(*lo, *hi),
            Rhs::Optional(rhs) => {
                let rule = rhs.build(rules, join);
                rules.optional(rule)
            }
            Rhs::Repeat(rhs) => {
                let rule = rhs.build(rules, join);
                rules.zero_or_more(rule)
            }
            Rhs::Group(rhs) => rhs.build(rules, join),
            Rhs::Exception(rhs, except) => {
                // a - b matches a wherever b doesn't match.
                let except = except.build(rules, join);
                let not = rules.not(except);
                let rule = rhs.build(rules, join);
                rules.all(not, rule)
            }
            Rhs::Alternation(rhs1, rhs2) => {
                let a = rhs1.build(rules, join);
                let b = rhs2.build(rules, join);
                rules.either(a, b)
            }
            Rhs::Concatenation(rhs1, rhs2) => {
                let a = rhs1.build(rules, join);
                let b = rhs2.build(rules, join);
                match join {
                    Join::Adjacent => rules.all(a, b),
                    Join::Spaced => rules.follows(a, b),
                }
            }
        }
    }
}

impl Display for Rhs {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rhs::Identifier(iden) => write!(f, "{}", iden),
            Rhs::Terminal(term) => write!(f, "{}", term),
            Rhs::Range(lo, hi) => write!(
                f,
                "{} .. {}",
                Terminal(lo.to_string()),
                Terminal(hi.to_string())
            ),
            Rhs::Optional(rhs) => write!(f, "[ {} ]", rhs),
            Rhs::Repeat(rhs) => write!(f, "{{ {} }}", rhs),
            Rhs::Group(rhs) => write!(f, "( {} )", rhs),
            Rhs::Exception(rhs1, rhs2) => write!(f, "{} - {}", rhs1, rhs2),
            Rhs::Alternation(rhs1, rhs2) => write!(f, "{} | {}", rhs1, rhs2),
            Rhs::Concatenation(rhs1, rhs2) => write!(f, "{} , {}", rhs1, rhs2),
        }
    }
}

impl FromStr for Rhs {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_, rhs) = parser::complete(parser::rhs)(s)?;
        Ok(rhs)
    }
}

/// A production rule.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Production {
    pub lhs: Lhs,
    pub rhs: Rhs,
}

impl Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} = {} ;", self.lhs, self.rhs)
    }
}

impl FromStr for Production {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_, rule) = parser::complete(parser::production)(s)?;
        Ok(rule)
    }
}

/// A set of rules. The first production is the start rule.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Grammar {
    pub rules: Vec<Production>,
}

impl Grammar {
    /// Register every production as a named rule, returning a reference to
    /// the first production.
    ///
    /// Fails if the grammar is empty or references a rule that isn't defined
    /// here or already registered in `rules`.
    pub fn install<S>(&self, rules: &mut Rules<S>) -> Result<RuleId, Error> {
        self.install_with(rules, Join::Adjacent)
    }

    /// Like `install`, but allows whitespace between concatenated items.
    pub fn install_spaced<S>(&self, rules: &mut Rules<S>) -> Result<RuleId, Error> {
        self.install_with(rules, Join::Spaced)
    }

    fn install_with<S>(&self, rules: &mut Rules<S>, join: Join) -> Result<RuleId, Error> {
        let start = self.rules.first().ok_or(Error::EmptyGrammar)?;
        for production in &self.rules {
            let rule = production.rhs.build(rules, join);
            if rules
                .add_named_rule(production.lhs.to_string(), rule)
                .is_some()
            {
                log::warn!("production '{}' defined more than once", production.lhs);
            }
        }
        rules.validate()?;
        Ok(rules.named(&start.lhs.to_string()))
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{}", rule)?;
        }
        Ok(())
    }
}

impl FromStr for Grammar {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_, grammar) = parser::complete(parser::grammar)(s)?;
        Ok(grammar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use descent::Engine;
    use std::fmt::Debug;
    use std::string::ToString;

    fn assert_lossless_conversion<T, E>(t: T)
    where
        T: ToString + FromStr<Err = E> + Eq + Debug,
        E: std::error::Error,
    {
        let s = t.to_string();
        let t_parse = T::from_str(&s).unwrap();
        assert_eq!(t, t_parse, "To string:\n{}\n", s);
    }

    #[test]
    fn lossless_rhs() {
        let tests = vec![
            Rhs::Exception(
                Box::new(Rhs::Terminal("hello".into())),
                Box::new(Rhs::Identifier("world".into())),
            ),
            Rhs::Alternation(
                Box::new(Rhs::Identifier("a".into())),
                Box::new(Rhs::Alternation(
                    Box::new(Rhs::Identifier("b".into())),
                    Box::new(Rhs::Concatenation(
                        Box::new(Rhs::Terminal("c".into())),
                        Box::new(Rhs::Terminal("d".into())),
                    )),
                )),
            ),
            Rhs::Concatenation(
                Box::new(Rhs::Range('0', '9')),
                Box::new(Rhs::Repeat(Box::new(Rhs::Group(Box::new(
                    Rhs::Alternation(
                        Box::new(Rhs::Terminal("\"".into())),
                        Box::new(Rhs::Optional(Box::new(Rhs::Identifier("x".into())))),
                    ),
                ))))),
            ),
        ];

        for test in tests {
            assert_lossless_conversion(test);
        }
    }

    #[test]
    fn terminal_with_both_quotes_does_not_reparse() {
        let term = Rhs::Terminal("it's \"x\"".into());
        assert!(term.to_string().parse::<Rhs>().is_err());

        let single = Rhs::Terminal("it's".into());
        assert_eq!(single.to_string(), "\"it's\"");
        assert_lossless_conversion(single);
    }

    #[test]
    fn lossless_rule() {
        let rule = Production {
            lhs: Lhs("a".into()),
            rhs: Rhs::Identifier("b".into()),
        };

        assert_lossless_conversion(rule)
    }

    #[test]
    fn lossless_grammar() {
        let g = Grammar {
            rules: vec![
                Production {
                    lhs: Lhs("a".into()),
                    rhs: Rhs::Identifier("b".into()),
                },
                Production {
                    lhs: Lhs("c".into()),
                    rhs: Rhs::Identifier("d".into()),
                },
            ],
        };

        assert_lossless_conversion(g);
    }

    #[test]
    fn install_and_match() {
        let g: Grammar = "
            list = item , { ',' , item } ;
            item = digit , { digit } | 'x' ;
            digit = '0' .. '9' ;
        "
        .parse()
        .unwrap();

        let mut engine: Engine = Engine::with_definition(move |rules| {
            let list = g.install(rules).unwrap();
            rules.eof(list)
        });

        let tests = vec![
            ("1", true),
            ("12,x,345", true),
            ("12, 3", false),
            ("12,", false),
            ("", false),
        ];
        for test in tests {
            assert_eq!(engine.recognize(test.0).unwrap(), test.1, "test case: {:?}", test);
        }
    }

    #[test]
    fn install_spaced_allows_whitespace() {
        let g: Grammar = "pair = '(' , word , ',' , word , ')' ; word = letter , { letter } ; letter = 'a' .. 'z' ;"
            .parse()
            .unwrap();

        let mut engine: Engine = Engine::new();
        let pair = g.install_spaced(engine.rules_mut()).unwrap();
        let root = engine.rules_mut().eof(pair);
        engine.set_root(root);

        assert!(engine.recognize("(ab,cd)").unwrap());
        assert!(engine.recognize("( ab , cd )").unwrap());
        // Concatenation inside `word` is spaced too.
        assert!(engine.recognize("(a b,cd)").unwrap());
        assert!(!engine.recognize("( ab  cd )").unwrap());
    }

    #[test]
    fn install_exception() {
        let g: Grammar = "word = letter - 'q' , { letter - 'q' } ; letter = 'a' .. 'z' ;"
            .parse()
            .unwrap();

        let mut engine: Engine = Engine::new();
        let word = g.install(engine.rules_mut()).unwrap();
        let root = engine.rules_mut().eof(word);
        engine.set_root(root);

        assert!(engine.recognize("abc").unwrap());
        assert!(!engine.recognize("aqc").unwrap());
    }

    #[test]
    fn install_empty_grammar() {
        let g = Grammar { rules: vec![] };
        let mut rules: Rules<()> = Rules::new();
        assert_eq!(g.install(&mut rules).unwrap_err(), Error::EmptyGrammar);
    }

    #[test]
    fn install_undefined_rule() {
        let g: Grammar = "a = b ;".parse().unwrap();
        let mut rules: Rules<()> = Rules::new();
        assert_eq!(
            g.install(&mut rules).unwrap_err(),
            Error::Install(descent::Error::UnknownRule("b".to_owned()))
        );
    }
}
