use nom::{
    branch::alt,
    bytes::complete::{tag, take_until},
    character::complete::{alpha1, alphanumeric1, char, multispace1},
    combinator::{all_consuming, map, map_opt, opt, recognize},
    multi::many0,
    sequence::{delimited, pair, preceded, separated_pair, terminated, tuple},
    IResult,
};

use crate::{Grammar, Identifier, Lhs, Production, Rhs, Terminal};

/// Run `f` over the whole input, allowing trailing whitespace.
pub fn complete<'a, O, F>(f: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    all_consuming(terminated(f, space))
}

pub fn terminal(input: &str) -> IResult<&str, Terminal> {
    let (rem, matched) = alt((
        delimited(tag("\""), take_until("\""), tag("\"")),
        delimited(tag("\'"), take_until("\'"), tag("\'")),
    ))(input)?;
    Ok((rem, Terminal(matched.to_owned())))
}

pub fn identifier(input: &str) -> IResult<&str, Identifier> {
    let (rem, matched) = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))(input)?;
    Ok((rem, Identifier(matched.to_owned())))
}

pub fn lhs(input: &str) -> IResult<&str, Lhs> {
    let (rem, matched) = identifier(input)?;
    Ok((rem, Lhs(matched)))
}

/// Alternation binds loosest, then concatenation, then exception.
/// Alternations and concatenations nest to the right.
pub fn rhs(input: &str) -> IResult<&str, Rhs> {
    let (rem, first) = concatenation(input)?;
    let (rem, rest) = many0(preceded(char('|'), concatenation))(rem)?;
    Ok((rem, fold_right(first, rest, Rhs::Alternation)))
}

pub fn production(input: &str) -> IResult<&str, Production> {
    let (rem, (rule_lhs, _, rule_rhs, _)) =
        ws(tuple((ws(lhs), char('='), rhs, char(';'))))(input)?;
    Ok((
        rem,
        Production {
            lhs: rule_lhs,
            rhs: rule_rhs,
        },
    ))
}

pub fn grammar(input: &str) -> IResult<&str, Grammar> {
    let (rem, rules) = many0(production)(input)?;
    Ok((rem, Grammar { rules }))
}

/// Whitespace and `(* *)` comments.
fn space(input: &str) -> IResult<&str, &str> {
    recognize(many0(alt((multispace1, comment))))(input)
}

fn comment(input: &str) -> IResult<&str, &str> {
    delimited(tag("(*"), take_until("*)"), tag("*)"))(input)
}

fn ws<'a, O, F>(f: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(space, f, space)
}

fn fold_right(first: Rhs, rest: Vec<Rhs>, join: fn(Box<Rhs>, Box<Rhs>) -> Rhs) -> Rhs {
    let mut items = rest.into_iter().rev();
    match items.next() {
        None => first,
        Some(last) => {
            let tail = items.fold(last, |acc, item| join(Box::new(item), Box::new(acc)));
            join(Box::new(first), Box::new(tail))
        }
    }
}

fn concatenation(input: &str) -> IResult<&str, Rhs> {
    let (rem, first) = exception(input)?;
    let (rem, rest) = many0(preceded(char(','), exception))(rem)?;
    Ok((rem, fold_right(first, rest, Rhs::Concatenation)))
}

fn exception(input: &str) -> IResult<&str, Rhs> {
    let (rem, base) = factor(input)?;
    let (rem, except) = opt(preceded(char('-'), factor))(rem)?;
    let rhs = match except {
        Some(except) => Rhs::Exception(Box::new(base), Box::new(except)),
        None => base,
    };
    Ok((rem, rhs))
}

fn factor(input: &str) -> IResult<&str, Rhs> {
    ws(alt((
        rhs_group,
        rhs_repetition,
        rhs_optional,
        rhs_range,
        rhs_terminal,
        rhs_identifier,
    )))(input)
}

fn rhs_identifier(input: &str) -> IResult<&str, Rhs> {
    map(identifier, Rhs::Identifier)(input)
}

fn rhs_terminal(input: &str) -> IResult<&str, Rhs> {
    map(terminal, Rhs::Terminal)(input)
}

/// A terminal holding exactly one char.
fn terminal_char(input: &str) -> IResult<&str, char> {
    map_opt(terminal, |term: Terminal| {
        let mut chars = term.0.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    })(input)
}

fn rhs_range(input: &str) -> IResult<&str, Rhs> {
    let (rem, (lo, hi)) = separated_pair(terminal_char, ws(tag("..")), terminal_char)(input)?;
    Ok((rem, Rhs::Range(lo, hi)))
}

fn rhs_group(input: &str) -> IResult<&str, Rhs> {
    let (rem, inner) = delimited(char('('), rhs, char(')'))(input)?;
    Ok((rem, Rhs::Group(Box::new(inner))))
}

fn rhs_repetition(input: &str) -> IResult<&str, Rhs> {
    let (rem, inner) = delimited(char('{'), rhs, char('}'))(input)?;
    Ok((rem, Rhs::Repeat(Box::new(inner))))
}

fn rhs_optional(input: &str) -> IResult<&str, Rhs> {
    let (rem, inner) = delimited(char('['), rhs, char(']'))(input)?;
    Ok((rem, Rhs::Optional(Box::new(inner))))
}
