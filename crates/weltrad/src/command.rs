//! Line protocol for driving the controls from a socket or a script.
//!
//! ```text
//! dial down 300 120 [t]      pointer events in dial space
//! dial set 4                 external worldview selection
//! cross show | cross hide
//! cross move 40 -10 [t]      pointer events in cross space
//! scroll begin | scroll offset 130
//! scroll release [t] | scroll settle [t]
//! scroll press 3 [t] | scroll goto 3 [t] | scroll items 12 [t]
//! frame 16                   advance clock and animations
//! ```

use kreisel::geometry::Point;
use kreisel::gesture::Millis;
use std::str::FromStr;
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, StrumDisplay)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ControlKind {
    Dial,
    Cross,
    Scroll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, StrumDisplay)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PointerAction {
    Down,
    Move,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Pointer {
        control: ControlKind,
        action: PointerAction,
        at: Point,
        t: Option<Millis>,
    },
    SelectWorldview(usize),
    ShowCross,
    HideCross,
    ScrollBegin,
    ScrollOffset(f64),
    ScrollRelease(Option<Millis>),
    ScrollSettle(Option<Millis>),
    ScrollPress(usize, Option<Millis>),
    ScrollGoto(usize, Option<Millis>),
    ScrollItems(usize, Option<Millis>),
    Frame(Millis),
}

#[derive(Error, Debug, PartialEq)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown control '{0}'")]
    UnknownControl(String),
    #[error("'{control}' does not understand '{action}'")]
    UnknownAction { control: String, action: String },
    #[error("missing {0}")]
    MissingArgument(&'static str),
    #[error("invalid {name} '{value}'")]
    InvalidNumber { name: &'static str, value: String },
    #[error("unexpected trailing input '{0}'")]
    TrailingInput(String),
}

struct Args<'a> {
    tokens: std::str::SplitWhitespace<'a>,
}

impl<'a> Args<'a> {
    fn next_word(&mut self, name: &'static str) -> Result<&'a str, ParseError> {
        self.tokens.next().ok_or(ParseError::MissingArgument(name))
    }

    fn number<T: FromStr>(&mut self, name: &'static str) -> Result<T, ParseError> {
        let raw = self.next_word(name)?;
        raw.parse().map_err(|_| ParseError::InvalidNumber {
            name,
            value: raw.to_string(),
        })
    }

    fn time(&mut self) -> Result<Option<Millis>, ParseError> {
        match self.tokens.next() {
            None => Ok(None),
            Some(raw) => raw
                .parse::<u64>()
                .map(|t| Some(Millis(t)))
                .map_err(|_| ParseError::InvalidNumber {
                    name: "timestamp",
                    value: raw.to_string(),
                }),
        }
    }

    fn finish(mut self, command: Command) -> Result<Command, ParseError> {
        match self.tokens.next() {
            Some(extra) => Err(ParseError::TrailingInput(extra.to_string())),
            None => Ok(command),
        }
    }
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut args = Args {
            tokens: line.split_whitespace(),
        };
        let head = args.tokens.next().ok_or(ParseError::Empty)?;

        if head.eq_ignore_ascii_case("frame") {
            let ms = args.number("frame duration")?;
            return args.finish(Command::Frame(Millis(ms)));
        }

        let control: ControlKind = head
            .parse()
            .map_err(|_| ParseError::UnknownControl(head.to_string()))?;
        let action = args.next_word("action")?;
        let unknown = || ParseError::UnknownAction {
            control: control.to_string(),
            action: action.to_string(),
        };

        let command = match (control, action.to_ascii_lowercase().as_str()) {
            (ControlKind::Dial, "set") => Command::SelectWorldview(args.number("index")?),
            (ControlKind::Cross, "show") => Command::ShowCross,
            (ControlKind::Cross, "hide") => Command::HideCross,
            (ControlKind::Dial | ControlKind::Cross, pointer) => {
                let action: PointerAction = pointer.parse().map_err(|_| unknown())?;
                let at = Point::new(args.number("x")?, args.number("y")?);
                Command::Pointer {
                    control,
                    action,
                    at,
                    t: args.time()?,
                }
            }
            (ControlKind::Scroll, "begin") => Command::ScrollBegin,
            (ControlKind::Scroll, "offset") => Command::ScrollOffset(args.number("offset")?),
            (ControlKind::Scroll, "release") => Command::ScrollRelease(args.time()?),
            (ControlKind::Scroll, "settle") => Command::ScrollSettle(args.time()?),
            (ControlKind::Scroll, "press") => {
                Command::ScrollPress(args.number("index")?, args.time()?)
            }
            (ControlKind::Scroll, "goto") => {
                Command::ScrollGoto(args.number("index")?, args.time()?)
            }
            (ControlKind::Scroll, "items") => {
                Command::ScrollItems(args.number("count")?, args.time()?)
            }
            (ControlKind::Scroll, _) => return Err(unknown()),
        };

        args.finish(command)
    }
}
