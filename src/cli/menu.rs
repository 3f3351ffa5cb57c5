//! Interactive text menu.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the menu provides the "run `covid` and pick an option" UX
//!
//! Validation is done by plain functions (`parse_menu_choice`,
//! `validate_state_name`); the prompt loops only print and re-ask. Loops read
//! from any `BufRead` so they can be driven from tests.

use std::io::{BufRead, Write};

use crate::domain::US_STATES;
use crate::error::AppError;

pub const MENU_TITLE: &str = "NYT COVID-19 Charts";

/// Main menu options, numbered from 1 when printed.
pub const MAIN_MENU: [&str; 4] = [
    "Create/Update COVID-19 charts by State",
    "Create/Update COVID-19 charts by County",
    "Delete rendered chart files",
    "Exit Program",
];

/// What the user picked from `MAIN_MENU`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    States,
    Counties,
    Clean,
    Exit,
}

impl MenuAction {
    pub fn from_choice(choice: usize) -> Option<Self> {
        match choice {
            1 => Some(MenuAction::States),
            2 => Some(MenuAction::Counties),
            3 => Some(MenuAction::Clean),
            4 => Some(MenuAction::Exit),
            _ => None,
        }
    }
}

/// Parse a 1-based menu selection.
pub fn parse_menu_choice(input: &str, option_count: usize) -> Result<usize, String> {
    let choice = input
        .trim()
        .parse::<usize>()
        .map_err(|_| "ERROR: Please enter an integer value.".to_string())?;
    if (1..=option_count).contains(&choice) {
        Ok(choice)
    } else {
        Err("ERROR: That is not one of the options.".to_string())
    }
}

/// Match a typed state name against `US_STATES` (case-insensitive, extra
/// whitespace ignored). Returns the canonical lowercase name.
pub fn validate_state_name(input: &str) -> Option<&'static str> {
    let normalized = input.split_whitespace().collect::<Vec<&str>>().join(" ").to_lowercase();
    US_STATES.iter().copied().find(|state| *state == normalized)
}

/// Show `options` until a valid number is entered. `None` means end of input.
pub fn num_menu<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    title: &str,
    options: &[&str],
) -> Result<Option<usize>, AppError> {
    loop {
        let rule = "-".repeat(40);
        writeln!(output, "{rule}\n{title}\n{rule}").map_err(write_err)?;
        for (idx, option) in options.iter().enumerate() {
            writeln!(output, "{}: {option}", idx + 1).map_err(write_err)?;
        }

        let Some(line) = prompt_line(input, output, "Enter your choice: ")? else {
            return Ok(None);
        };
        match parse_menu_choice(&line, options.len()) {
            Ok(choice) => return Ok(Some(choice)),
            Err(msg) => writeln!(output, "{msg}").map_err(write_err)?,
        }
    }
}

/// Ask for a state name until it is one of `US_STATES`. `None` means end of input.
pub fn prompt_state<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<Option<&'static str>, AppError> {
    loop {
        let Some(line) = prompt_line(
            input,
            output,
            "What state would you like to retrieve county data for?: ",
        )?
        else {
            return Ok(None);
        };
        match validate_state_name(&line) {
            Some(state) => return Ok(Some(state)),
            None => writeln!(output, "That is not a valid U.S. State. Please try again.").map_err(write_err)?,
        }
    }
}

fn prompt_line<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> Result<Option<String>, AppError> {
    write!(output, "{prompt}").map_err(write_err)?;
    output.flush().map_err(write_err)?;

    let mut line = String::new();
    let bytes = input
        .read_line(&mut line)
        .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;
    if bytes == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn write_err(e: std::io::Error) -> AppError {
    AppError::new(2, format!("Failed to write prompt: {e}"))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn menu_choice_must_be_an_integer_in_range() {
        assert_eq!(parse_menu_choice(" 2 ", 4), Ok(2));
        assert!(parse_menu_choice("two", 4).unwrap_err().contains("integer"));
        assert!(parse_menu_choice("0", 4).unwrap_err().contains("not one of the options"));
        assert!(parse_menu_choice("5", 4).is_err());
    }

    #[test]
    fn state_names_are_matched_case_insensitively() {
        assert_eq!(validate_state_name("Texas"), Some("texas"));
        assert_eq!(validate_state_name("  NEW   york "), Some("new york"));
        assert_eq!(validate_state_name("District of Columbia"), Some("district of columbia"));
        assert_eq!(validate_state_name("PUERTO RICO"), Some("puerto rico"));
        assert_eq!(validate_state_name("Texsa"), None);
        assert_eq!(validate_state_name(""), None);
    }

    #[test]
    fn num_menu_reprompts_until_valid() {
        let mut input = Cursor::new("abc\n9\n3\n");
        let mut output = Vec::new();
        let choice = num_menu(&mut input, &mut output, MENU_TITLE, &MAIN_MENU).unwrap();
        assert_eq!(choice, Some(3));

        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("1: Create/Update COVID-19 charts by State"));
        assert!(shown.contains("ERROR: Please enter an integer value."));
        assert!(shown.contains("ERROR: That is not one of the options."));
        assert_eq!(shown.matches("Enter your choice: ").count(), 3);
    }

    #[test]
    fn num_menu_returns_none_at_end_of_input() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        assert_eq!(num_menu(&mut input, &mut output, MENU_TITLE, &MAIN_MENU).unwrap(), None);
    }

    #[test]
    fn prompt_state_reprompts_on_unknown_names() {
        let mut input = Cursor::new("Atlantis\nnew mexico\n");
        let mut output = Vec::new();
        assert_eq!(prompt_state(&mut input, &mut output).unwrap(), Some("new mexico"));
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("That is not a valid U.S. State."));
    }

    #[test]
    fn menu_actions_follow_option_order() {
        assert_eq!(MenuAction::from_choice(1), Some(MenuAction::States));
        assert_eq!(MenuAction::from_choice(4), Some(MenuAction::Exit));
        assert_eq!(MenuAction::from_choice(MAIN_MENU.len() + 1), None);
    }
}
