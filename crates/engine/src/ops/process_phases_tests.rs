use super::*;

use convoy_core::plan_fn;

use crate::ops::options::PhaseRef;

#[test]
fn named_phases_pass_through_in_order() {
    let (names, inline) = process_phases(&["settings".into(), "configure".into()]);

    assert_eq!(names.len(), 2);
    assert_eq!(names[0].as_str(), "settings");
    assert_eq!(names[1].as_str(), "configure");
    assert!(inline.is_empty());
}

#[test]
fn inline_plans_get_synthesized_names() {
    let plan = plan_fn(|_s| async { Ok(serde_json::Value::Null) });
    let (names, inline) = process_phases(&[
        "configure".into(),
        PhaseRef::Inline(plan.clone()),
        PhaseRef::Inline(plan),
    ]);

    assert_eq!(names.len(), 3);
    assert_eq!(inline.len(), 2);
    // synthesized names are distinct and registered
    assert_ne!(names[1], names[2]);
    assert!(inline.contains(&names[1]));
    assert!(inline.contains(&names[2]));
    assert!(names[1].as_str().starts_with("phase-"));
}

#[test]
fn empty_input_is_empty_output() {
    let (names, inline) = process_phases(&[]);
    assert!(names.is_empty());
    assert!(inline.is_empty());
}
