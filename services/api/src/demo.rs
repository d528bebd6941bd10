use clap::Args;
use srms::config::LookupConfig;
use srms::error::AppError;
use srms::grading::GradingConfig;
use srms::identity::{format_for_incremental_input, next_roll_number, normalize};
use srms::lookup::{ResultCard, ResultService};
use srms::password::evaluate;
use srms::records::{ClassSubject, RecordBook, StudentRecord, SubjectMark};
use std::fmt::Write as _;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Show percentages with two decimals, as on the printed result.
    #[arg(long)]
    pub(crate) printable: bool,
}

/// Records served when no CSV export is supplied.
pub(crate) fn seed_book() -> RecordBook {
    let student = |id: u64, name: &str, class_name: &str, roll_no: &str, dob: &str| StudentRecord {
        student_id: Some(id),
        name: name.to_string(),
        email: format!(
            "{}@school.test",
            name.to_ascii_lowercase().replace(' ', ".")
        ),
        class_name: class_name.to_string(),
        roll_no: roll_no.to_string(),
        dob: dob.to_string(),
        phone: None,
    };

    let mut book = RecordBook {
        students: vec![
            student(1, "Kiran Rao", "Class 5", "5A01", "2010-03-14"),
            student(2, "Asha Verma", "Class 5", "5A02", "12/08/2010"),
            student(3, "Dev Sharma", "Class 3", "3A01", "02-11-2012"),
        ],
        ..RecordBook::default()
    };

    let mut marks_id = 0;
    for (student_id, subject, obtained) in [
        (1, "Maths", 82),
        (1, "Science", 91),
        (1, "English", 77),
        (2, "Maths", 70),
        (2, "Science", 20),
        (2, "English", 55),
    ] {
        marks_id += 1;
        book.marks.push(
            SubjectMark::new(subject, obtained)
                .out_of(100)
                .with_id(marks_id)
                .for_student(student_id),
        );
    }

    book.class_subjects.insert(
        5,
        ["Maths", "Science", "English"]
            .into_iter()
            .map(ClassSubject::named)
            .collect(),
    );
    book.class_subjects.insert(
        3,
        ["Maths", "EVS"].into_iter().map(ClassSubject::named).collect(),
    );
    book
}

/// Plain-text result card for terminal output.
pub(crate) fn render_result_card(card: &ResultCard) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({}, {})  DOB {}",
        card.name, card.roll_no, card.class_name, card.dob
    );

    if card.summary.is_pending() {
        let _ = writeln!(out, "  Result not published yet (status {})", card.summary.status);
        return out;
    }

    for line in &card.summary.subjects {
        let _ = writeln!(
            out,
            "  {:<14} {:>3}/{:<3} {:>3}%  {}",
            line.subject,
            line.marks_obtained,
            line.max_marks,
            line.percentage,
            if line.passed { "pass" } else { "fail" }
        );
    }
    let _ = writeln!(
        out,
        "  Total {}/{}  Percentage {}%  Grade {}  Status {}",
        card.summary.total,
        card.summary.max_total,
        card.summary.percentage_text(),
        card.summary.grade,
        card.summary.status
    );
    if let Some(remark) = &card.remark {
        let _ = writeln!(out, "  Remark {remark}");
    }
    let _ = writeln!(out, "  Share {}", card.share_payload);
    out
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let grading = if args.printable {
        GradingConfig::default().printable()
    } else {
        GradingConfig::default()
    };
    let book = Arc::new(seed_book());
    let service = ResultService::new(
        book.clone(),
        book.clone(),
        book.clone(),
        grading,
        &LookupConfig::default(),
    );

    println!("Student result demo");

    println!("\nDate of birth input");
    for typed in ["1208", "12082010", "2010-08-12T00:00:00", "31/13/2010"] {
        let shown = format_for_incremental_input(typed);
        match normalize(typed) {
            Ok(date) => println!("  {typed:<22} typed as {shown:<12} -> {}", date.display()),
            Err(rejection) => println!("  {typed:<22} typed as {shown:<12} -> {rejection}"),
        }
    }

    println!("\nResult lookups");
    for (roll_no, dob) in [
        ("5a01", "14032010"),
        ("5A02", "2010-08-12"),
        ("3A01", "2/11/2012"),
        ("5A02", "13/08/2010"),
    ] {
        match service.lookup(roll_no, dob) {
            Ok(card) => print!("{}", render_result_card(&card)),
            Err(err) => println!("{roll_no} / {dob}: {err}"),
        }
    }

    println!("\nRoll number suggestions");
    for class_name in ["Class 5", "Class 3", "Class 8"] {
        println!(
            "  {class_name}: {}",
            next_roll_number(class_name, &book.students)
        );
    }

    println!("\nPassword feedback");
    for (password, email) in [
        ("kiran2010", "kiran.rao@school.test"),
        ("Tr0ub4dor&Horse", "kiran.rao@school.test"),
    ] {
        let strength = evaluate(password, email);
        println!("  {password}: {}", strength.label);
        for issue in &strength.issues {
            println!("    - {issue}");
        }
    }

    Ok(())
}
