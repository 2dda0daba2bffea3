use chrono::{Duration, TimeZone, Utc};
use portal_core::{
    Behavior, DataManager, ManualClock, MemoryKeyValueStore, PortalError, Profile,
    ProgressReportData, ProgressReportPatch, Role, UserId, ValidationError,
};
use uuid::Uuid;

struct Classroom {
    portal: DataManager<MemoryKeyValueStore, ManualClock>,
    teacher: UserId,
    student: UserId,
}

fn classroom() -> Classroom {
    let start = Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).unwrap();
    let mut portal = DataManager::open_with_clock(
        MemoryKeyValueStore::new(),
        ManualClock::stepping(start, Duration::minutes(1)),
    )
    .unwrap();
    let teacher = portal
        .add_user("mrsmith", "pw", Role::Teacher, Profile::default())
        .unwrap()
        .id;
    portal
        .update_teacher_profile(teacher, Profile::named("John Smith"))
        .unwrap();
    let student = portal
        .add_user("alice", "pw", Role::Student, Profile::default())
        .unwrap()
        .id;
    portal
        .update_student_profile(student, Profile::named("Alice"))
        .unwrap();
    Classroom {
        portal,
        teacher,
        student,
    }
}

fn report(math: u32, remarks: &str) -> ProgressReportData {
    ProgressReportData {
        math: Some(math),
        behavior: Some(Behavior::Good),
        remarks: remarks.to_string(),
        ..ProgressReportData::default()
    }
}

#[test]
fn reports_are_listed_newest_first() {
    let Classroom {
        mut portal,
        teacher,
        student,
    } = classroom();

    portal
        .add_progress_report(teacher, student, report(70, "first term"))
        .unwrap();
    portal
        .add_progress_report(teacher, student, report(85, "second term"))
        .unwrap();

    let reports = portal.get_progress_reports_for_student(student);
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].data.remarks, "second term");
    assert_eq!(reports[1].data.math, Some(70));
    assert!(portal.get_progress_reports_for_student(teacher).is_empty());
}

#[test]
fn out_of_range_scores_and_unknown_people_are_rejected() {
    let Classroom {
        mut portal,
        teacher,
        student,
    } = classroom();

    let err = portal
        .add_progress_report(teacher, student, report(101, ""))
        .unwrap_err();
    assert!(matches!(
        err,
        PortalError::Validation(ValidationError::ScoreOutOfRange {
            field: "math",
            value: 101
        })
    ));

    let err = portal
        .add_progress_report(student, student, report(50, ""))
        .unwrap_err();
    assert!(matches!(err, PortalError::TeacherNotFound(_)));
    let err = portal
        .add_progress_report(teacher, teacher, report(50, ""))
        .unwrap_err();
    assert!(matches!(err, PortalError::StudentNotFound(_)));
    assert!(portal.data().progress_reports.is_empty());
}

#[test]
fn update_merges_only_given_fields() {
    let Classroom {
        mut portal,
        teacher,
        student,
    } = classroom();
    let created = portal
        .add_progress_report(teacher, student, report(60, "keep going"))
        .unwrap();

    let updated = portal
        .update_progress_report(
            created.id,
            ProgressReportPatch {
                science: Some(92),
                behavior: Some(Behavior::Excellent),
                ..ProgressReportPatch::default()
            },
        )
        .unwrap();

    assert_eq!(updated.data.math, Some(60));
    assert_eq!(updated.data.science, Some(92));
    assert_eq!(updated.data.behavior, Some(Behavior::Excellent));
    assert_eq!(updated.data.remarks, "keep going");
    assert_eq!(updated.created_at, created.created_at);
}

#[test]
fn update_of_unknown_report_or_bad_score_fails() {
    let Classroom {
        mut portal,
        teacher,
        student,
    } = classroom();
    let created = portal
        .add_progress_report(teacher, student, report(60, ""))
        .unwrap();

    let missing = Uuid::new_v4();
    let err = portal
        .update_progress_report(missing, ProgressReportPatch::default())
        .unwrap_err();
    assert!(matches!(err, PortalError::ReportNotFound(id) if id == missing));

    let err = portal
        .update_progress_report(
            created.id,
            ProgressReportPatch {
                english: Some(150),
                ..ProgressReportPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, PortalError::Validation(_)));
    assert_eq!(portal.data().progress_reports[0].data.english, None);
}

#[test]
fn notices_are_scoped_to_teacher_and_their_students() {
    let Classroom {
        mut portal,
        teacher,
        student,
    } = classroom();
    let other = portal
        .add_user("mrsjones", "pw", Role::Teacher, Profile::default())
        .unwrap()
        .id;

    portal
        .add_notice(teacher, "Field trip", "Bring lunch")
        .unwrap();
    portal
        .add_notice(teacher, "Exam week", "Revise chapters 1-4")
        .unwrap();
    portal.add_notice(other, "Staff only", "").unwrap();

    let notices = portal.get_notices_for_students(teacher);
    let titles: Vec<&str> = notices.iter().map(|notice| notice.title.as_str()).collect();
    assert_eq!(titles, vec!["Exam week", "Field trip"]);
    assert_eq!(portal.notices_for_student(student).unwrap().len(), 2);

    let err = portal.add_notice(teacher, " ", "body").unwrap_err();
    assert!(matches!(
        err,
        PortalError::Validation(ValidationError::BlankField("title"))
    ));
}

#[test]
fn report_card_collects_student_teacher_and_reports() {
    let Classroom {
        mut portal,
        teacher,
        student,
    } = classroom();
    portal
        .add_progress_report(teacher, student, report(75, "steady"))
        .unwrap();

    let card = portal.student_report_card(student).unwrap();

    assert_eq!(card.student.student_id, "STU20260001");
    assert_eq!(card.teacher_name.as_deref(), Some("John Smith"));
    assert_eq!(card.reports.len(), 1);
    assert!(card.generated_at > card.reports[0].created_at);
    assert!(matches!(
        portal.student_report_card(teacher),
        Err(PortalError::StudentNotFound(_))
    ));
}

#[test]
fn stored_reports_accept_string_scores() {
    let Classroom {
        mut portal,
        teacher,
        student,
    } = classroom();
    let mut document: serde_json::Value =
        serde_json::from_str(&portal.export_data().unwrap()).unwrap();
    document["progressReports"] = serde_json::json!([{
        "id": Uuid::new_v4(),
        "teacherId": teacher,
        "studentId": student,
        "math": "88",
        "science": "",
        "behavior": "Needs Improvement",
        "remarks": "",
        "createdAt": "2026-09-02T10:00:00Z"
    }]);

    portal.import_data(&document.to_string()).unwrap();

    let reports = portal.get_progress_reports_for_student(student);
    assert_eq!(reports[0].data.math, Some(88));
    assert_eq!(reports[0].data.science, None);
    assert_eq!(reports[0].data.behavior, Some(Behavior::NeedsImprovement));
}
