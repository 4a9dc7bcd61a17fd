use crate::output::Output;
use color_eyre::Result;
use dialoguer::{Confirm, Input, Password};

/// Prompt for a string value with optional default
pub fn prompt_string(prompt: &str, default: Option<&str>) -> Result<String> {
    let mut input_builder = Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(true);

    if let Some(default_value) = default {
        input_builder = input_builder.default(default_value.to_string());
    }

    input_builder.interact_text().map_err(|e| color_eyre::eyre::eyre!("Failed to read input: {}", e))
}

/// Prompt for a secret (masked input), confirming it twice when asked to
pub fn prompt_secret(prompt: &str, confirm: bool) -> Result<String> {
    let mut password_prompt = Password::new().with_prompt(prompt);
    if confirm {
        password_prompt = password_prompt.with_confirmation(format!("Confirm {}", prompt), "Values do not match");
    }

    password_prompt
        .interact()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read {}: {}", prompt, e))
}

/// Prompt for yes/no with optional default
pub fn prompt_yes_no(prompt: &str, default: Option<bool>) -> Result<bool> {
    let mut confirm_builder = Confirm::new().with_prompt(prompt);

    if let Some(default_value) = default {
        confirm_builder = confirm_builder.default(default_value);
    }

    confirm_builder.interact().map_err(|e| color_eyre::eyre::eyre!("Failed to read confirmation: {}", e))
}

/// Prompt until the answer parses as a positive number
pub fn prompt_positive_number(prompt: &str, default: usize, output: &Output) -> Result<usize> {
    loop {
        let input_str = Input::<String>::new()
            .with_prompt(prompt)
            .default(default.to_string())
            .interact_text()
            .map_err(|e| color_eyre::eyre::eyre!("Failed to read input: {}", e))?;

        match parse_positive(&input_str) {
            Some(num) => return Ok(num),
            None => output.error("Invalid input. Please enter a number greater than zero."),
        }
    }
}

fn parse_positive(input: &str) -> Option<usize> {
    input.trim().parse::<usize>().ok().filter(|n| *n > 0)
}
