//! Integration tests for placeholder resolution

use pretty_assertions::assert_eq;

use release_template::{render, resolve, NestedValue, Resolver, TemplateError, Value, ValueMap};

#[test]
fn test_replaces_a_with_b() {
    let values = ValueMap::new().with("$A", "B");
    assert_eq!(resolve("$A", &values).unwrap(), "B");
}

#[test]
fn test_semver_from_numbers() {
    let values = ValueMap::new()
        .with("$MAJOR", 1)
        .with("$MINOR", 0)
        .with("$PATCH", 0);
    assert_eq!(resolve("$MAJOR.$MINOR.$PATCH", &values).unwrap(), "1.0.0");
}

#[test]
fn test_replaces_changes_but_leaves_next_patch_version() {
    let input = "# v$NEXT_PATCH_VERSION\n    ## CHANGES\n\n    $CHANGES\n    ";
    let values = ValueMap::new().with("$CHANGES", "NO CHANGES");

    let output = resolve(input, &values).unwrap();
    assert!(output.contains("v$NEXT_PATCH_VERSION"));
    assert!(output.contains("NO CHANGES"));
}

#[test]
fn test_unbound_tokens_are_untouched() {
    let input = "$A and $B with $C_D";
    let values = ValueMap::new().with("$X", "x").with("$Y", 2);
    assert_eq!(resolve(input, &values).unwrap(), input);
    assert_eq!(resolve(input, &ValueMap::new()).unwrap(), input);
}

#[test]
fn test_every_occurrence_replaced() {
    let values = ValueMap::new().with("$TAG", "v3");
    let output = resolve("$TAG, $TAG and ($TAG)", &values).unwrap();
    assert_eq!(output, "v3, v3 and (v3)");
    assert!(!output.contains("$TAG"));
}

#[test]
fn test_nested_template_three_levels() {
    let values = ValueMap::new().with(
        "$NEXT_MAJOR_VERSION",
        NestedValue::new("$MAJOR.$MINOR.$PATCH.$THIRD")
            .with("$MAJOR", 1)
            .with("$MINOR", 0)
            .with("$PATCH", 0)
            .with(
                "$THIRD",
                NestedValue::new("$NEST").with("$NEST", "THIRD LEVEL"),
            ),
    );
    assert_eq!(
        resolve("$NEXT_MAJOR_VERSION", &values).unwrap(),
        "1.0.0.THIRD LEVEL"
    );
}

#[test]
fn test_nested_template_pair() {
    let values = ValueMap::new().with("$X", NestedValue::new("$A.$B").with("$A", 1).with("$B", 2));
    assert_eq!(resolve("$X", &values).unwrap(), "1.2");
}

#[test]
fn test_release_tag_name_and_version() {
    assert_eq!(
        resolve("$RELEASE_TAG", &ValueMap::new().with("$RELEASE_TAG", "v1.0.0")).unwrap(),
        "v1.0.0"
    );
    assert_eq!(
        resolve("$RELEASE_NAME", &ValueMap::new().with("$RELEASE_NAME", "hello world")).unwrap(),
        "hello world"
    );
    assert_eq!(
        resolve("$RELEASE_VERSION", &ValueMap::new().with("$RELEASE_VERSION", "v2")).unwrap(),
        "v2"
    );
}

#[test]
fn test_all_version_info_replaced() {
    let tag = 2;
    let version = format!("v{}", tag);
    let name = format!("Beta release ({})", version);

    let values = ValueMap::new()
        .with("$RELEASE_TAG", tag)
        .with("$RELEASE_VERSION", version.clone())
        .with("$RELEASE_NAME", name.clone());

    let output = resolve(
        "tag: $RELEASE_TAG\nversion: $RELEASE_VERSION\nname: $RELEASE_NAME",
        &values,
    )
    .unwrap();

    assert_eq!(output, format!("tag: {}\nversion: {}\nname: {}", tag, version, name));
}

#[test]
fn test_result_independent_of_binding_order() {
    let template = "$ONE $TWO $THREE";
    let forward: ValueMap = [("$ONE", "$TWO"), ("$TWO", "$THREE"), ("$THREE", "3")]
        .into_iter()
        .collect();
    let backward: ValueMap = [("$THREE", "3"), ("$TWO", "$THREE"), ("$ONE", "$TWO")]
        .into_iter()
        .collect();

    let a = resolve(template, &forward).unwrap();
    let b = resolve(template, &backward).unwrap();
    assert_eq!(a, "$TWO $THREE 3");
    assert_eq!(a, b);
}

#[test]
fn test_malformed_nested_value() {
    let values = ValueMap::new().with(
        "$CONTRIBUTORS",
        NestedValue::without_template().with("$NAME", "octocat"),
    );
    let err = resolve("Thanks $CONTRIBUTORS", &values).unwrap_err();
    assert_eq!(err, TemplateError::malformed("$CONTRIBUTORS"));
}

#[test]
fn test_recursion_limit_is_an_error() {
    let mut value = NestedValue::new("bottom");
    for _ in 0..100 {
        value = NestedValue::new("$V").with("$V", value);
    }
    let values = ValueMap::new().with("$V", value);

    let err = Resolver::new().resolve("$V", &values).unwrap_err();
    assert!(matches!(err, TemplateError::RecursionLimit { limit: 32, .. }));

    let deep = Resolver::new().with_max_depth(200);
    assert_eq!(deep.resolve("$V", &values).unwrap(), "bottom");
}

#[test]
fn test_null_value_leaves_token() {
    let values = ValueMap::new().with("$PREVIOUS_TAG", Value::Null);
    assert_eq!(
        render("since $PREVIOUS_TAG", &values, None).unwrap(),
        "since $PREVIOUS_TAG"
    );
}

#[test]
fn test_values_from_json() {
    let values: ValueMap = serde_json::from_str(
        r#"{
            "$RELEASE_TAG": 2,
            "$NEXT_MINOR_VERSION": { "template": "$MAJOR.$MINOR.0", "$MAJOR": 1, "$MINOR": 5 }
        }"#,
    )
    .unwrap();
    assert_eq!(
        resolve("$RELEASE_TAG -> $NEXT_MINOR_VERSION", &values).unwrap(),
        "2 -> 1.5.0"
    );
}

#[test]
fn test_concurrent_resolution() {
    let values = ValueMap::new().with("$N", NestedValue::new("$A-$B").with("$A", "a").with("$B", "b"));
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| resolve("[$N]", &values)))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), "[a-b]");
        }
    });
}
