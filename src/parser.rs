use crate::cue::{Cue, CueId};
use crate::error::CueError;

use std::time::Duration;

use nom::bytes::complete::{tag, take_while_m_n};
use nom::character::complete::{digit1, line_ending, multispace0, not_line_ending, one_of, space1};
use nom::combinator::{all_consuming, consumed, eof, map_res, opt, peek, verify};
use nom::error::{convert_error, ErrorKind, VerboseError};
use nom::multi::many0;
use nom::sequence::{preceded, terminated};
use nom::{branch::alt, error_position, Err, IResult};

type ParseResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

type Timing<'a> = ((&'a str, Duration), (&'a str, Duration), Option<&'a str>);

#[derive(Default)]
pub struct Parser;
impl Parser {
    pub fn new() -> Self {
        Self {}
    }

    /// Parses a complete WebVTT document. Any malformed block rejects the
    /// whole document; cues are returned in the order they were written.
    pub fn parse(&self, input: &str) -> Result<Vec<Cue>, CueError> {
        match vtt_file(input) {
            Ok((_, cues)) => Ok(cues),
            Err(Err::Error(err)) | Err(Err::Failure(err)) => {
                Err(CueError::Parse(convert_error(input, err)))
            }
            Err(Err::Incomplete(_)) => {
                unreachable!("Incomplete data received by non-streaming parser.")
            }
        }
    }
}

/// Converts a cue timestamp such as `00:01:30.500` into seconds.
///
/// Hours are optional and `,` is accepted in place of `.`.
pub fn convert_time_to_seconds(ts: &str) -> Result<f64, CueError> {
    all_consuming(timestamp)(ts.trim())
        .map(|(_, duration)| duration.as_secs_f64())
        .map_err(|_| CueError::Timestamp(ts.to_string()))
}

fn optional_bom(input: &str) -> ParseResult<Option<&str>> {
    opt(tag("\u{FEFF}"))(input)
}

fn vtt_file(input: &str) -> ParseResult<Vec<Cue>> {
    let (input, _) = optional_bom(input)?;
    let (input, _) = header(input)?;

    let mut cues = Vec::new();
    let mut input = input;
    loop {
        let (rem_input, _) = multispace0(input)?;
        input = rem_input;
        if input.is_empty() {
            return Ok((input, cues));
        }
        if let Ok((rem_input, _)) = comment_block(input) {
            input = rem_input;
            continue;
        }
        let (rem_input, cue) = cue_block(input, cues.len() + 1)?;
        cues.push(cue);
        input = rem_input;
    }
}

fn header(input: &str) -> ParseResult<()> {
    let (input, _) = tag("WEBVTT")(input)?;
    let (input, _) = alt((
        preceded(one_of(" \t"), not_line_ending),
        peek(line_ending),
        eof,
    ))(input)?;
    let (input, _) = following_lines(input)?;
    Ok((input, ()))
}

/// NOTE, STYLE and REGION blocks carry nothing we display.
fn comment_block(input: &str) -> ParseResult<()> {
    let (input, _) = alt((tag("NOTE"), tag("STYLE"), tag("REGION")))(input)?;
    let (input, _) = alt((space1, peek(line_ending), eof))(input)?;
    let (input, _) = not_line_ending(input)?;
    let (input, _) = following_lines(input)?;
    Ok((input, ()))
}

fn cue_block(input: &str, index: usize) -> ParseResult<Cue> {
    let (input, identifier) = opt(terminated(
        verify(not_line_ending, |s: &str| {
            !s.trim().is_empty() && !s.contains("-->")
        }),
        line_ending,
    ))(input)?;
    let (input, ((start_time, show_at), (end_time, hide_at), settings)) = timing(input)?;
    let (input, _) = peek(alt((line_ending, eof)))(input)?;
    let (input, text) = following_lines(input)?;

    let id = match identifier {
        Some(name) => CueId::Named(name.trim().to_string()),
        None => CueId::Index(index),
    };

    Ok((
        input,
        Cue {
            id,
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            text: text.join("\n"),
            settings: settings.map(String::from),
            show_at,
            hide_at,
        },
    ))
}

/// Lines up to the next blank line, the next timing line, or the end of
/// input. Whitespace-only lines count as blank.
fn following_lines(input: &str) -> ParseResult<Vec<&str>> {
    many0(preceded(
        line_ending,
        verify(not_line_ending, |s: &str| {
            !s.trim().is_empty() && !s.contains("-->")
        }),
    ))(input)
}

fn timing(input: &str) -> ParseResult<Timing> {
    let (input, start) = consumed(timestamp)(input)?;
    let (input, _) = space1(input)?;
    let (input, _) = tag("-->")(input)?;
    let (input, _) = space1(input)?;
    let (input, end) = consumed(timestamp)(input)?;
    let (input, settings) = opt(preceded(space1, not_line_ending))(input)?;

    let settings = settings.map(str::trim).filter(|s| !s.is_empty());
    Ok((input, (start, end, settings)))
}

fn timestamp(input: &str) -> ParseResult<Duration> {
    const MILLIS_MIN: usize = 1;
    const MILLIS_MAX: usize = 3;
    let mut take_millis = map_res(
        take_while_m_n(MILLIS_MIN, MILLIS_MAX, |c: char| c.is_ascii_digit()),
        |s: &str| {
            // `.5` means half a second, so short fractions are right-padded.
            format!("{:0<3}", s).parse::<u64>()
        },
    );

    let (rem_input, first) = number(input)?;
    let (rem_input, _) = tag(":")(rem_input)?;
    let (rem_input, second) = number(rem_input)?;
    let (rem_input, third) = opt(preceded(tag(":"), number))(rem_input)?;
    let (rem_input, _) = one_of(".,")(rem_input)?;
    let (rem_input, millis) = take_millis(rem_input)?;

    let (hours, minutes, seconds) = match third {
        Some(seconds) => (first, second, seconds),
        None => (0, first, second),
    };
    if minutes >= 60 || seconds >= 60 {
        return Err(Err::Error(error_position!(input, ErrorKind::Verify)));
    }

    let total_millis = hours
        .checked_mul(60 * 60 * 1000)
        .and_then(|h| h.checked_add(minutes * 60 * 1000 + seconds * 1000 + millis));
    match total_millis {
        Some(total) => Ok((rem_input, Duration::from_millis(total))),
        None => Err(Err::Error(error_position!(input, ErrorKind::TooLarge))),
    }
}

fn number(input: &str) -> ParseResult<u64> {
    map_res(digit1, |s: &str| s.parse::<u64>())(input)
}
