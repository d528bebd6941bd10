use crate::demo::render_result_card;
use srms::identity::format_for_incremental_input;
use srms::lookup::{LookupState, MarksSource, ResultLookupFlow, RosterSource, SubjectSource};
use std::io::{self, BufRead, Write};

const ROLL_PROMPT: &str = "Enter your Roll Number:";
const DOB_PROMPT: &str = "Enter your Date of Birth (DD-MM-YYYY):";
const AGAIN_PROMPT: &str = "Type another Roll Number to check a different result, or 'quit'.";

/// Line-oriented lookup conversation. `restart` starts over, `quit` or EOF ends it.
pub(crate) fn run_chat<R, M, S, I, O>(
    flow: &mut ResultLookupFlow<R, M, S>,
    input: I,
    mut output: O,
) -> io::Result<()>
where
    R: RosterSource,
    M: MarksSource,
    S: SubjectSource,
    I: BufRead,
    O: Write,
{
    writeln!(output, "Welcome! I can show your published result.")?;
    writeln!(output, "{ROLL_PROMPT}")?;

    for line in input.lines() {
        let line = line?;
        let text = line.trim();
        match text.to_ascii_lowercase().as_str() {
            "quit" | "exit" => break,
            "restart" => {
                flow.reset();
                writeln!(output, "{ROLL_PROMPT}")?;
                continue;
            }
            _ => {}
        }

        let awaiting_dob = matches!(flow.state(), LookupState::AwaitingDateOfBirth { .. });
        if awaiting_dob {
            let typed = if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
                format_for_incremental_input(text)
            } else {
                text.to_string()
            };
            if let Err(rejection) = flow.submit_date_of_birth(&typed) {
                writeln!(output, "{}", rejection.message())?;
                writeln!(output, "{DOB_PROMPT}")?;
                continue;
            }

            match flow.present() {
                Ok(card) => {
                    write!(output, "{}", render_result_card(&card))?;
                    writeln!(output, "{AGAIN_PROMPT}")?;
                }
                Err(rejection) => writeln!(output, "{}", rejection.message())?,
            }
        } else {
            match flow.submit_roll_number(text) {
                Ok(student) => {
                    writeln!(output, "Hi {}! {DOB_PROMPT}", student.name)?;
                }
                Err(rejection) => {
                    writeln!(output, "{}", rejection.message())?;
                    writeln!(output, "{ROLL_PROMPT}")?;
                }
            }
        }
    }

    writeln!(output, "Goodbye.")?;
    Ok(())
}
