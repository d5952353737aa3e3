//! Property tests for the update engine.

use chart_values_patcher::{update, Splice};
use proptest::prelude::*;
use serde_yaml::Value;
use std::collections::BTreeMap;

fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// A values document with one `sectionN` mapping per entry of `values`.
fn sections(values: &[String]) -> String {
    values
        .iter()
        .enumerate()
        .map(|(idx, value)| format!("section{idx}:\n  image: {value} # image {idx}\n  keep: k{idx}\n"))
        .collect()
}

fn plain_value() -> impl Strategy<Value = String> {
    "img-[a-z0-9./-]{0,20}"
}

fn any_value() -> impl Strategy<Value = String> {
    prop_oneof![
        plain_value(),
        "[ -~]{0,24}",
        "[a-zé☕ü -]{0,12}",
        Just("1.25".to_string()),
        Just("true".to_string()),
        Just("".to_string()),
    ]
}

/// Pair up the distinct, sorted `cuts` into disjoint non-empty ranges of
/// `content`, one splice per range.
fn splices_at(content: &str, cuts: &[usize], texts: &[String]) -> Vec<Splice> {
    let mut bounds: Vec<usize> = cuts.iter().map(|cut| cut % (content.len() + 1)).collect();
    bounds.sort_unstable();
    bounds.dedup();
    bounds
        .chunks_exact(2)
        .zip(texts)
        .map(|(range, text)| Splice::new(range[0], range[1], text.clone()))
        .collect()
}

proptest! {
    #[test]
    fn batched_splices_compose_like_independent_edits(
        content in "[a-z \n]{0,60}",
        cuts in prop::collection::vec(0usize..64, 0..10),
        texts in prop::collection::vec("[A-Z]{0,5}", 5),
        reverse in any::<bool>(),
    ) {
        let splices = splices_at(&content, &cuts, &texts);

        // Compose by hand, front to back, from the untouched original.
        let mut expected = String::new();
        let mut cursor = 0;
        for splice in &splices {
            expected.push_str(&content[cursor..splice.byte_start]);
            expected.push_str(&splice.new_text);
            cursor = splice.byte_end;
        }
        expected.push_str(&content[cursor..]);

        let mut batch = splices.clone();
        if reverse {
            batch.reverse();
        }
        let applied = Splice::apply_batch(&content, batch).unwrap();
        prop_assert_eq!(applied, expected);
    }

    #[test]
    fn only_the_target_line_changes(
        values in prop::collection::vec(plain_value(), 1..6),
        target in 0usize..6,
        new_value in any_value(),
    ) {
        let target = target % values.len();
        let document = sections(&values);
        let out = update(
            document.as_bytes(),
            &format!(".section{target}"),
            "",
            &BTreeMap::new(),
            &map(&[("image", &new_value)]),
        ).unwrap();
        let out = String::from_utf8(out).unwrap();

        let before: Vec<&str> = document.lines().collect();
        let after: Vec<&str> = out.lines().collect();
        prop_assert_eq!(before.len(), after.len());
        for (idx, (old, new)) in before.iter().zip(&after).enumerate() {
            if idx == target * 3 + 1 {
                let comment = format!(" # image {target}");
                prop_assert!(new.starts_with("  image: "));
                prop_assert!(new.ends_with(&comment));
            } else {
                prop_assert_eq!(old, new);
            }
        }

        let parsed: Value = serde_yaml::from_str(&out).unwrap();
        let section = format!("section{target}");
        prop_assert_eq!(&parsed[section.as_str()]["image"], &Value::from(new_value.as_str()));
    }

    #[test]
    fn every_selected_mapping_is_rewritten(
        count in 1usize..8,
        new_value in any_value(),
    ) {
        let values = vec!["old".to_string(); count];
        let document = sections(&values);
        let out = update(
            document.as_bytes(),
            "",
            "",
            &map(&[("image", "old")]),
            &map(&[("image", &new_value)]),
        ).unwrap();

        let parsed: Value = serde_yaml::from_slice(&out).unwrap();
        for idx in 0..count {
            let section = format!("section{idx}");
            let keep = format!("k{idx}");
            prop_assert_eq!(&parsed[section.as_str()]["image"], &Value::from(new_value.as_str()));
            prop_assert_eq!(&parsed[section.as_str()]["keep"], &Value::from(keep.as_str()));
        }
    }

    #[test]
    fn unmatched_selectors_leave_bytes_identical(
        values in prop::collection::vec(plain_value(), 1..6),
        new_value in any_value(),
    ) {
        let document = sections(&values);
        let out = update(
            document.as_bytes(),
            "",
            "",
            &map(&[("image", "Not A Plain Value")]),
            &map(&[("image", &new_value)]),
        ).unwrap();
        prop_assert_eq!(out, document.into_bytes());
    }

    #[test]
    fn multi_byte_text_before_the_value_on_the_same_line(
        prefix in "[a-zäöüé☕]{1,6}",
        old in plain_value(),
        new_value in any_value(),
    ) {
        let document = format!("a: {{{prefix}x: {prefix}-v, image: {old}}}\n");
        let out = update(
            document.as_bytes(),
            ".a",
            "",
            &BTreeMap::new(),
            &map(&[("image", &new_value)]),
        ).unwrap();
        let out = String::from_utf8(out).unwrap();

        let kept = format!("a: {{{prefix}x: {prefix}-v, image: ");
        prop_assert!(out.starts_with(&kept));
        let closing = "}\n";
        prop_assert!(out.ends_with(closing));

        let parsed: Value = serde_yaml::from_str(&out).unwrap();
        let key = format!("{prefix}x");
        prop_assert_eq!(&parsed["a"]["image"], &Value::from(new_value.as_str()));
        let kept_value = format!("{prefix}-v");
        prop_assert_eq!(&parsed["a"][key.as_str()], &Value::from(kept_value.as_str()));
    }
}
