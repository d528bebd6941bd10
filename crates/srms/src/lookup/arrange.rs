use crate::records::{ClassSubject, SubjectMark};

/// Restrict `marks` to the class's subjects, one mark per subject, in class order.
///
/// Duplicates keep the highest `marks_id`; equal ids keep the later entry.
pub fn arrange_for_class(marks: Vec<SubjectMark>, subjects: &[ClassSubject]) -> Vec<SubjectMark> {
    let mut slots: Vec<Option<SubjectMark>> = vec![None; subjects.len()];

    for mark in marks {
        let Some(position) = subjects
            .iter()
            .position(|subject| mark.is_subject(&subject.subject_name))
        else {
            continue;
        };

        let replace = match &slots[position] {
            Some(kept) => mark.marks_id >= kept.marks_id,
            None => true,
        };
        if replace {
            slots[position] = Some(mark);
        }
    }

    slots.into_iter().flatten().collect()
}
