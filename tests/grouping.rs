use seriesalign::data::grouping::{palette_color, GroupingModel};
use seriesalign::AlignError;

fn ids(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

#[test]
fn default_groups_and_upload_assignment() {
    let mut model = GroupingModel::default();
    let names: Vec<&str> = model.groups().iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, ["Normal", "Abnormal"]);
    assert_eq!(model.upload_group(), "Normal");

    model.set_upload_group("Abnormal").unwrap();
    assert_eq!(model.assign_default("s1"), "Abnormal");
    model.set_upload_group("Normal").unwrap();
    assert_eq!(
        model.assign_default("s1"),
        "Abnormal",
        "existing assignments are not overwritten"
    );
}

#[test]
fn empty_seed_list_still_has_a_group() {
    let model = GroupingModel::new(&[]);
    assert_eq!(model.groups().len(), 1);
    assert_eq!(model.upload_group(), model.groups()[0].name);
}

#[test]
fn add_group_rejects_duplicates_and_blank_names() {
    let mut model = GroupingModel::default();
    assert_eq!(
        model.add_group("Normal").unwrap_err(),
        AlignError::GroupExists("Normal".to_string())
    );
    assert_eq!(model.add_group("   ").unwrap_err(), AlignError::EmptyGroupName);
    let g = model.add_group(" Faulty ").unwrap();
    assert_eq!(g.name, "Faulty");
    assert_eq!(model.groups().len(), 3);
}

#[test]
fn group_colors_are_distinct() {
    let mut model = GroupingModel::default();
    for i in 0..20 {
        model.add_group(&format!("g{i}")).unwrap();
    }
    let colors: Vec<_> = model.groups().iter().map(|g| g.color).collect();
    for (i, a) in colors.iter().enumerate() {
        for b in &colors[i + 1..] {
            assert_ne!(a, b, "every group gets its own color");
        }
    }
    assert_eq!(palette_color(0), model.groups()[0].color);
}

#[test]
fn deleting_a_group_reassigns_members_and_references() {
    let mut model = GroupingModel::default();
    model.add_group("Extra").unwrap();
    model.move_series("a", "Extra").unwrap();
    model.move_series("b", "Abnormal").unwrap();
    model.set_reference_group("Extra").unwrap();
    model.set_upload_group("Extra").unwrap();

    let before = model.groups().len();
    let fallback = model.delete_group("Extra").unwrap();
    assert_eq!(model.groups().len(), before - 1);
    assert_eq!(fallback, "Normal");
    assert_eq!(model.group_of("a"), Some("Normal"));
    assert_eq!(model.group_of("b"), Some("Abnormal"));
    assert_eq!(model.reference_group(), "Normal");
    assert_eq!(model.upload_group(), "Normal");
    assert!(!model.contains("Extra"));
}

#[test]
fn last_group_cannot_be_deleted() {
    let mut model = GroupingModel::new(&["Only"]);
    model.move_series("a", "Only").unwrap();
    let before = model.clone();

    assert_eq!(model.delete_group("Only").unwrap_err(), AlignError::LastGroup);
    assert_eq!(model, before, "a rejected delete changes nothing");
    assert_eq!(model.group_of("a"), Some("Only"));
    assert_eq!(model.upload_group(), "Only");
    assert_eq!(model.reference_group(), "Only");

    assert_eq!(
        model.delete_group("Missing").unwrap_err(),
        AlignError::UnknownGroup("Missing".to_string())
    );
    assert_eq!(model, before);
}

#[test]
fn move_to_unknown_group_is_rejected() {
    let mut model = GroupingModel::default();
    assert!(model.move_series("a", "Nope").is_err());
    assert_eq!(model.group_of("a"), None);
}

#[test]
fn members_follow_id_order() {
    let mut model = GroupingModel::default();
    let all = ids(&["c", "a", "b"]);
    for id in &all {
        model.assign_default(id);
    }
    model.move_series("a", "Abnormal").unwrap();
    let normal: Vec<&String> = model.members("Normal", &all);
    assert_eq!(normal, [&all[0], &all[2]]);
    assert_eq!(model.members("Abnormal", &all), [&all[1]]);
}
