use super::config::GradingConfig;
use super::SubjectLine;
use crate::records::SubjectMark;

/// Entries without a subject or marks, or with marks outside `[0, max]`, are dropped.
pub(crate) fn usable_lines(marks: &[SubjectMark], config: &GradingConfig) -> Vec<SubjectLine> {
    marks
        .iter()
        .filter_map(|mark| line_for(mark, config))
        .collect()
}

fn line_for(mark: &SubjectMark, config: &GradingConfig) -> Option<SubjectLine> {
    let subject = mark.subject_name()?;
    let obtained = mark.marks_obtained?;
    let max_marks = mark.max_marks_or(config.default_max_marks);
    if max_marks == 0 || obtained < 0 || obtained > i64::from(max_marks) {
        return None;
    }
    let obtained = u32::try_from(obtained).ok()?;

    Some(SubjectLine {
        subject: subject.to_string(),
        marks_obtained: obtained,
        max_marks,
        percentage: whole_percentage(u64::from(obtained), u64::from(max_marks)),
        passed: obtained >= config.pass_mark,
    })
}

pub(crate) fn whole_percentage(total: u64, max_total: u64) -> u32 {
    if max_total == 0 {
        return 0;
    }
    (total as f64 * 100.0 / max_total as f64).round() as u32
}

pub(crate) fn rounded_percentage(total: u64, max_total: u64, precision: u8) -> f64 {
    if max_total == 0 {
        return 0.0;
    }
    let scale = 10f64.powi(i32::from(precision));
    (total as f64 * 100.0 / max_total as f64 * scale).round() / scale
}
