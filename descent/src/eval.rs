//! Backtracking evaluation of rules.
//!
//! Every combinator restores the cursor to its entry position when it fails,
//! with one exception: `all` (and `follows`) leave the cursor where the
//! second part gave up. Rolling back a partial sequence is left to whatever
//! encloses it.

use regex::Regex;

use crate::error::{Error, Result};
use crate::rule::{Label, Rule, RuleId, Rules};
use crate::state::State;

/// Evaluate the rule `id` at the state's current position.
///
/// An `Err` only ever signals a broken grammar. Input that doesn't match is
/// `Ok(false)`.
pub fn eval<'a, S>(rules: &'a Rules<S>, state: &mut State<'a>, id: RuleId) -> Result<bool> {
    let rule = rules.get(id);
    state.enter(&Label(rule));

    let res = match rule {
        Rule::Literal(text) => literal(state, text),
        Rule::Range(lo, hi) => range(state, *lo, *hi),
        Rule::Pattern { regex, .. } => pattern(state, regex.as_ref()),
        Rule::Not(inner) => {
            let pos = state.position();
            let matched = eval(rules, state, *inner)?;
            state.seek(pos);
            !matched
        }
        Rule::EndOfInput(inner) => {
            let pos = state.position();
            let matched = eval(rules, state, *inner)? && state.cursor().eof();
            if !matched {
                state.seek(pos);
            }
            matched
        }
        Rule::All(a, b) => eval(rules, state, *a)? && eval(rules, state, *b)?,
        Rule::Follows(a, b) => {
            eval(rules, state, *a)?
                && eval(rules, state, rules.whitespace())?
                && eval(rules, state, *b)?
        }
        Rule::Either(a, b) => {
            let pos = state.position();
            if eval(rules, state, *a)? {
                true
            } else {
                state.seek(pos);
                let matched = eval(rules, state, *b)?;
                if !matched {
                    state.seek(pos);
                }
                matched
            }
        }
        Rule::ZeroOrMore(inner) => {
            repeat(rules, state, *inner)?;
            true
        }
        Rule::OneOrMore(inner) => {
            let pos = state.position();
            let found = repeat(rules, state, *inner)? > 0;
            if !found {
                state.seek(pos);
            }
            found
        }
        Rule::Optional(inner) => {
            let pos = state.position();
            if !eval(rules, state, *inner)? {
                state.seek(pos);
            }
            true
        }
        Rule::Named(name) => named(rules, state, name)?,
        Rule::Action(inner, _) => {
            let pos = state.position();
            let mark = state.capture_mark();
            if eval(rules, state, *inner)? {
                state.push_capture(pos, id);
                true
            } else {
                state.truncate_captures(mark);
                state.seek(pos);
                false
            }
        }
    };

    state.leave(&Label(rule), res);
    Ok(res)
}

fn literal(state: &mut State<'_>, text: &str) -> bool {
    let cursor = state.cursor_mut();
    let pos = cursor.position();
    for expected in text.chars() {
        if cursor.read() != Some(expected) {
            cursor.seek(pos);
            return false;
        }
    }
    true
}

/// Compares the next char against the bounds as strings, not as code points.
fn range(state: &mut State<'_>, lo: char, hi: char) -> bool {
    let cursor = state.cursor_mut();
    let pos = cursor.position();
    if let Some(c) = cursor.read() {
        let (mut lo_buf, mut hi_buf, mut c_buf) = ([0; 4], [0; 4], [0; 4]);
        let lo: &str = lo.encode_utf8(&mut lo_buf);
        let hi: &str = hi.encode_utf8(&mut hi_buf);
        let c: &str = c.encode_utf8(&mut c_buf);
        if lo <= c && c <= hi {
            return true;
        }
    }
    cursor.seek(pos);
    false
}

fn pattern(state: &mut State<'_>, regex: Option<&Regex>) -> bool {
    let regex = match regex {
        Some(regex) => regex,
        None => return false,
    };
    let cursor = state.cursor_mut();
    match regex.find(cursor.remainder()) {
        Some(m) => {
            cursor.skip(m.end());
            true
        }
        None => false,
    }
}

/// Apply `inner` until it fails, returning how many times it matched. Stops
/// early if a match consumed nothing, since it would match forever.
fn repeat<'a, S>(rules: &'a Rules<S>, state: &mut State<'a>, inner: RuleId) -> Result<usize> {
    let mut count = 0;
    loop {
        let pos = state.position();
        if !eval(rules, state, inner)? {
            state.seek(pos);
            return Ok(count);
        }
        count += 1;
        if state.position() == pos {
            return Ok(count);
        }
    }
}

/// Evaluate a rule by name. A rule referencing itself while it's the active
/// named rule is refused, which turns immediate left recursion into a
/// failure. Longer cycles (a -> b -> a) are not caught.
fn named<'a, S>(rules: &'a Rules<S>, state: &mut State<'a>, name: &'a str) -> Result<bool> {
    if state.active() == Some(name) {
        state.blocked(name);
        return Ok(false);
    }
    let rule = rules
        .named_rule(name)
        .ok_or_else(|| Error::UnknownRule(name.to_owned()))?;

    let pos = state.position();
    let prior = state.activate(name);
    let res = eval(rules, state, rule);
    state.set_active(prior);

    let matched = res?;
    if !matched {
        state.seek(pos);
    }
    Ok(matched)
}
