use descent::{eval, Engine, RuleId, Rules, State};
use proptest::prelude::*;

/// Evaluate `rule` on `input` starting at byte offset `start`.
fn run(rules: &Rules<()>, rule: RuleId, input: &str, start: usize) -> (bool, usize) {
    let mut state = State::new(input, false);
    state.seek(start);
    let res = eval(rules, &mut state, rule).unwrap();
    (res, state.position())
}

fn text() -> impl Strategy<Value = String> {
    "[ab(é) ]{0,12}"
}

proptest! {
    #[test]
    fn literal_matches_iff_prefix(input in text(), lit in "[ab(é)]{0,4}", skip in 0usize..6) {
        let start = input.char_indices().map(|(i, _)| i).nth(skip).unwrap_or(input.len());
        let mut g = Rules::new();
        let rule = g.literal(&lit);

        let (res, pos) = run(&g, rule, &input, start);
        let expected = input[start..].starts_with(lit.as_str());
        prop_assert_eq!(res, expected);
        if expected {
            prop_assert_eq!(pos, start + lit.len());
        } else {
            prop_assert_eq!(pos, start);
        }
    }

    #[test]
    fn optional_always_matches(input in text(), lit in "[ab]{1,3}") {
        let mut g = Rules::new();
        let seq = g.all("a", lit.as_str());
        let rule = g.optional(seq);
        let (res, pos) = run(&g, rule, &input, 0);
        prop_assert!(res);

        let (inner, inner_pos) = run(&g, seq, &input, 0);
        if inner {
            prop_assert_eq!(pos, inner_pos);
        } else {
            prop_assert_eq!(pos, 0);
        }
    }

    #[test]
    fn zero_or_more_always_matches(input in text()) {
        let mut g = Rules::new();
        let ab = g.all("a", "b");
        let rule = g.zero_or_more(ab);
        let (res, pos) = run(&g, rule, &input, 0);
        prop_assert!(res);
        // Only whole "ab" pairs are consumed.
        prop_assert_eq!(pos % 2, 0);
        prop_assert_eq!(&input[..pos], "ab".repeat(pos / 2));
    }

    #[test]
    fn one_or_more_needs_a_match(input in text()) {
        let mut g = Rules::new();
        let rule = g.one_or_more("a");
        let (res, pos) = run(&g, rule, &input, 0);
        let count = input.chars().take_while(|c| *c == 'a').count();
        prop_assert_eq!(res, count > 0);
        prop_assert_eq!(pos, count);
    }

    #[test]
    fn either_never_stops_mid_branch(input in text()) {
        let mut g = Rules::new();
        let (a, b) = (g.literal("a"), g.literal("b"));
        let left = g.all_of(&[a, b, a]);
        let right = g.all("a", "é");
        let rule = g.either(left, right);
        let (res, pos) = run(&g, rule, &input, 0);
        if input.starts_with("aba") {
            prop_assert_eq!((res, pos), (true, 3));
        } else if input.starts_with("aé") {
            prop_assert_eq!((res, pos), (true, 3));
        } else {
            prop_assert_eq!((res, pos), (false, 0));
        }
    }

    #[test]
    fn captured_number_is_exact(prefix in "[a-z+ ]{0,5}", number in "[0-9]{1,6}", suffix in "[a-z+ ]{0,5}") {
        let mut engine: Engine<Vec<String>> = Engine::with_definition(|g| {
            let digit = g.range('0', '9');
            let digits = g.one_or_more(digit);
            let number = g.action(digits, |out: &mut Vec<String>, m| out.push(m.text().to_owned()));
            let other = g.pattern("[a-z+ ]");
            let other = g.zero_or_more(other);
            let rule = g.all_of(&[other, number, other]);
            g.eof(rule)
        });

        let input = format!("{}{}{}", prefix, number, suffix);
        let mut out = Vec::new();
        prop_assert!(engine.parse(&input, &mut out).unwrap());
        prop_assert_eq!(out, vec![number]);
    }
}
