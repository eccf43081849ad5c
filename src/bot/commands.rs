//! Bot commands and their typed arguments.
//!
//! Arguments follow a `key:value` style close to slash-command options:
//!
//! ```text
//! /cat_says Hello there tag:cute font_size:60 font_color:#ff00ff
//! ```
//!
//! Leading words belong to the command's main field (`tag` for `/cat`,
//! `text` for the captioned variants). A `key:value` word with a known key
//! starts a new field, and later words keep extending it. Spacing and line
//! breaks inside a value are kept as typed.

use std::ops::Range;
use teloxide::utils::command::{BotCommands, ParseError};

/// Supported commands for the bot
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "snake_case", description = "Supported commands:")]
pub enum Command {
    /// Greet the user and list commands
    #[command(description = "Start the bot.")]
    Start,
    /// List commands
    #[command(description = "Show this help.")]
    Help,
    /// List every tag known upstream
    #[command(description = "List all available cat tags.")]
    CatTags,
    /// Random cat picture
    #[command(
        description = "Get a random cat picture. Usage: /cat [tag[,tag...]]",
        parse_with = parse_cat
    )]
    Cat(CatRequest),
    /// Random cat GIF
    #[command(description = "Get a random animated cat GIF.")]
    CatGif,
    /// Cat picture with a caption
    #[command(
        description = "Get a cat picture with custom text. Usage: /cat_says <text> [tag:..] [font_size:..] [font_color:..]",
        parse_with = parse_cat_says
    )]
    CatSays(CatSaysRequest),
    /// Cat GIF with a caption
    #[command(
        description = "Get an animated cat GIF with custom text. Usage: /cat_gif_says <text> [font_size:..] [font_color:..] [filter:..]",
        parse_with = parse_cat_gif_says
    )]
    CatGifSays(CatGifSaysRequest),
}

/// Arguments of `/cat`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatRequest {
    /// Optional tag filter, commas separate several tags
    pub tag: Option<String>,
}

/// Arguments of `/cat_says`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatSaysRequest {
    /// Caption drawn on the picture
    pub text: String,
    /// Optional tag filter
    pub tag: Option<String>,
    /// Optional font size
    pub font_size: Option<i64>,
    /// Optional font color, any CSS color the API accepts
    pub font_color: Option<String>,
}

/// Arguments of `/cat_gif_says`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatGifSaysRequest {
    /// Caption drawn on the GIF
    pub text: String,
    /// Optional font size
    pub font_size: Option<i64>,
    /// Optional font color
    pub font_color: Option<String>,
    /// Optional image filter (mono, sepia, negative, ...)
    pub filter: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Text,
    Tag,
    FontSize,
    FontColor,
    Filter,
}

impl Field {
    fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "tag" => Some(Self::Tag),
            "font_size" => Some(Self::FontSize),
            "font_color" => Some(Self::FontColor),
            "filter" => Some(Self::Filter),
            _ => None,
        }
    }

    const fn key(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Tag => "tag",
            Self::FontSize => "font_size",
            Self::FontColor => "font_color",
            Self::Filter => "filter",
        }
    }
}

/// Field values as byte ranges into the raw argument string, so a value
/// keeps its inner spacing and line breaks
#[derive(Debug)]
struct Fields<'a> {
    input: &'a str,
    values: Vec<(Field, Range<usize>)>,
}

impl<'a> Fields<'a> {
    /// Split `input` into fields, starting with `primary`
    fn parse(input: &'a str, primary: Field, allowed: &[Field]) -> Result<Self, ParseError> {
        let mut fields = Self {
            input,
            values: Vec::new(),
        };
        let mut current = primary;

        for word in words(input) {
            let token = &input[word.clone()];
            let option = token
                .split_once(':')
                .and_then(|(key, _)| Field::from_key(key).map(|field| (field, key.len() + 1)));

            match option {
                Some((field, prefix_len)) => {
                    if !allowed.contains(&field) {
                        return Err(custom(format!(
                            "option `{}` is not supported by this command",
                            field.key()
                        )));
                    }
                    current = field;
                    fields.start(field, word.start + prefix_len..word.end);
                }
                None => fields.extend(current, word),
            }
        }

        Ok(fields)
    }

    /// Begin `field` again; a repeated key replaces the earlier value
    fn start(&mut self, field: Field, value: Range<usize>) {
        self.values.retain(|(f, _)| *f != field);
        self.values.push((field, value));
    }

    /// Grow the current field up to the end of `word`
    fn extend(&mut self, field: Field, word: Range<usize>) {
        match self.values.last_mut() {
            Some((f, range)) if *f == field => range.end = word.end,
            _ => self.values.push((field, word)),
        }
    }

    fn take(&mut self, field: Field) -> Option<String> {
        let index = self.values.iter().position(|(f, _)| *f == field)?;
        let (_, range) = self.values.remove(index);
        let value = self.input[range].trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    fn take_required(&mut self, field: Field) -> Result<String, ParseError> {
        self.take(field)
            .ok_or_else(|| custom(format!("`{}` is required", field.key())))
    }

    fn take_int(&mut self, field: Field) -> Result<Option<i64>, ParseError> {
        self.take(field)
            .map(|raw| {
                raw.parse::<i64>().map_err(|_| {
                    custom(format!(
                        "`{}` must be a whole number, got `{raw}`",
                        field.key()
                    ))
                })
            })
            .transpose()
    }
}

/// Byte ranges of the whitespace-separated words of `input`
fn words(input: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = None;
    for (i, c) in input.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                spans.push(s..i);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        spans.push(s..input.len());
    }
    spans
}

fn custom(message: String) -> ParseError {
    ParseError::Custom(message.into())
}

/// Parse `/cat` arguments
///
/// # Errors
///
/// Returns `ParseError::Custom` on options `/cat` does not take.
pub fn parse_cat(input: String) -> Result<(CatRequest,), ParseError> {
    let mut fields = Fields::parse(&input, Field::Tag, &[Field::Tag])?;
    Ok((CatRequest {
        tag: fields.take(Field::Tag),
    },))
}

/// Parse `/cat_says` arguments
///
/// # Errors
///
/// Returns `ParseError::Custom` if the text is missing, the font size is not
/// an integer, or an unsupported option is given.
pub fn parse_cat_says(input: String) -> Result<(CatSaysRequest,), ParseError> {
    let allowed = [Field::Text, Field::Tag, Field::FontSize, Field::FontColor];
    let mut fields = Fields::parse(&input, Field::Text, &allowed)?;
    Ok((CatSaysRequest {
        text: fields.take_required(Field::Text)?,
        tag: fields.take(Field::Tag),
        font_size: fields.take_int(Field::FontSize)?,
        font_color: fields.take(Field::FontColor),
    },))
}

/// Parse `/cat_gif_says` arguments
///
/// # Errors
///
/// Returns `ParseError::Custom` if the text is missing, the font size is not
/// an integer, or an unsupported option is given.
pub fn parse_cat_gif_says(input: String) -> Result<(CatGifSaysRequest,), ParseError> {
    let allowed = [Field::Text, Field::FontSize, Field::FontColor, Field::Filter];
    let mut fields = Fields::parse(&input, Field::Text, &allowed)?;
    Ok((CatGifSaysRequest {
        text: fields.take_required(Field::Text)?,
        font_size: fields.take_int(Field::FontSize)?,
        font_color: fields.take(Field::FontColor),
        filter: fields.take(Field::Filter),
    },))
}

/// Explain why a message addressed to one of our commands did not parse.
///
/// Returns `None` for plain text, foreign commands and commands that parse
/// fine; those are not our business here.
#[must_use]
pub fn usage_reply(text: &str, bot_name: &str) -> Option<String> {
    let name = text
        .strip_prefix('/')?
        .split_whitespace()
        .next()?
        .split('@')
        .next()?;

    let known = Command::bot_commands()
        .iter()
        .any(|c| c.command.trim_start_matches('/') == name);
    if !known {
        return None;
    }

    match Command::parse(text, bot_name) {
        Ok(_) => None,
        Err(e) => Some(format!("⚠️ {e}\n\n{}", Command::descriptions())),
    }
}
