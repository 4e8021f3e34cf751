use clap::ValueEnum;

use crate::command::Cli;

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum Output {
    Plain,
    Json,
    None,
}

pub enum CommandOutput {
    Plain(String),
    /// Structured output, with the text used for plain rendering.
    Object {
        plain: String,
        json: serde_json::Value,
    },
}
pub type CommandResult = color_eyre::eyre::Result<CommandOutput>;

impl From<()> for CommandOutput {
    fn from(_: ()) -> Self {
        CommandOutput::Plain(String::new())
    }
}

pub struct RenderConfig {
    pub output: Output,
    pub quiet: bool,
}

impl RenderConfig {
    pub fn new(cli: &Cli) -> Self {
        Self {
            output: cli.output,
            quiet: cli.quiet,
        }
    }

    pub fn render_result(&self, result: CommandResult) -> color_eyre::eyre::Result<()> {
        match result {
            // Errors will be passed through to the caller, and rendered by the main function
            Err(e) => Err(e),

            Ok(_) if self.quiet || self.output == Output::None => Ok(()),

            Ok(CommandOutput::Plain(text)) => {
                if !text.is_empty() {
                    println!("{}", text);
                }
                Ok(())
            }

            Ok(CommandOutput::Object { plain, json }) => {
                match self.output {
                    Output::Plain => println!("{}", plain),
                    Output::Json => println!("{}", serde_json::to_string_pretty(&json)?),
                    Output::None => unreachable!(),
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_renders_as_empty_text() {
        let output: CommandOutput = ().into();
        assert!(matches!(output, CommandOutput::Plain(ref text) if text.is_empty()));

        let config = RenderConfig {
            output: Output::Json,
            quiet: false,
        };
        config.render_result(Ok(output)).unwrap();
    }
}
