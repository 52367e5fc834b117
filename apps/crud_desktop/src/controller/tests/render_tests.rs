use super::*;

fn resource(id: i64, name: Option<&str>, created_at: &str, updated_at: &str) -> Resource {
    Resource {
        id: ResourceId(id),
        name: name.map(str::to_string),
        created_at: created_at.to_string(),
        updated_at: updated_at.to_string(),
    }
}

#[test]
fn renders_single_resource_with_formatted_timestamps() {
    let list = vec![resource(
        1,
        Some("A"),
        "2024-01-01T00:00:00Z",
        "2024-01-01T00:00:00Z",
    )];

    let body = render_resource_table(&list, TimestampZone::Utc);

    let TableBody::Rows(rows) = body else {
        panic!("expected rows");
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id_text, "1");
    assert_eq!(rows[0].name, "A");
    assert_eq!(rows[0].created_at, "2024-01-01 00:00:00");
    assert_eq!(rows[0].updated_at, "2024-01-01 00:00:00");
}

#[test]
fn row_count_matches_list_and_keeps_server_order() {
    let list = vec![
        resource(9, Some("nine"), "2024-01-01T00:00:00Z", "2024-01-01T00:00:00Z"),
        resource(2, None, "2024-01-01T00:00:00Z", "2024-01-01T00:00:00Z"),
        resource(5, Some(""), "2024-01-01T00:00:00Z", "2024-01-01T00:00:00Z"),
    ];

    let body = render_resource_table(&list, TimestampZone::Utc);

    assert_eq!(body.row_count(), 3);
    let TableBody::Rows(rows) = body else {
        panic!("expected rows");
    };
    let ids: Vec<_> = rows.iter().map(|row| row.id_text.as_str()).collect();
    assert_eq!(ids, ["9", "2", "5"]);
    assert_eq!(rows[1].name, UNNAMED_RESOURCE);
    assert_eq!(rows[2].name, UNNAMED_RESOURCE);
}

#[test]
fn row_actions_target_the_row_id() {
    let row = render_resource_row(
        &resource(7, Some("x"), "2024-01-01T00:00:00Z", "2024-01-01T00:00:00Z"),
        TimestampZone::Utc,
    );

    assert_eq!(row.actions[0].action, RowAction::Edit);
    assert_eq!(row.actions[1].action, RowAction::Delete);
    assert!(row.actions.iter().all(|trigger| trigger.target == ResourceId(7)));
}

#[test]
fn empty_list_renders_single_placeholder_spanning_columns() {
    let body = render_resource_table(&[], TimestampZone::Utc);

    assert_eq!(
        body,
        TableBody::Empty(EmptyStateView {
            message: "No resources yet.",
            colspan: RESOURCE_COLUMNS.len(),
        })
    );
    assert_eq!(body.row_count(), 0);
}

#[test]
fn timestamps_with_offsets_are_normalized_to_utc() {
    assert_eq!(
        format_timestamp("2024-03-05T09:07:03.123456+09:00", TimestampZone::Utc),
        "2024-03-05 00:07:03"
    );
}

#[test]
fn unparseable_timestamp_is_shown_verbatim() {
    assert_eq!(format_timestamp("yesterday", TimestampZone::Utc), "yesterday");
    assert_eq!(format_timestamp("", TimestampZone::Local), "");
}

#[test]
fn student_detail_lists_age_and_score() {
    let student = Student {
        id: StudentId(4),
        name: "Cheolsu".to_string(),
        age: 6,
        score: 90,
    };

    let detail = render_student_detail(&student);

    assert_eq!(detail.heading, "Details for Cheolsu");
    assert_eq!(detail.lines, ["Age: 6", "Score: 90 points"]);
}

#[test]
fn student_rows_expose_detail_trigger() {
    let students = vec![Student {
        id: StudentId(0),
        name: "Jjanggu".to_string(),
        age: 5,
        score: 100,
    }];

    let TableBody::Rows(rows) = render_student_table(&students) else {
        panic!("expected rows");
    };
    assert_eq!(rows[0].select.action, RowAction::ShowDetail);
    assert_eq!(rows[0].select.target, StudentId(0));
    assert_eq!(rows[0].score, "100");
    assert!(matches!(render_student_table(&[]), TableBody::Empty(_)));
}
