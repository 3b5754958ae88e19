use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{char, space0},
    combinator::{map, rest},
    multi::separated_list1,
    sequence::{preceded, tuple},
    IResult,
};

/// Number of tab-separated columns in a CoNLL-U token line.
pub const COLUMNS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    Blank,
    SentId(&'a str),
    Text(&'a str),
    /// Any other `#` line.
    Comment,
    Token(Vec<&'a str>),
}

fn metadata<'a>(key: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    preceded(
        tuple((char('#'), space0, tag(key), space0, char('='), space0)),
        rest,
    )
}

fn columns(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list1(char('\t'), take_while(|c| c != '\t'))(input)
}

/// Classifies one line. The input is expected to be trimmed.
pub fn classify(line: &str) -> Line<'_> {
    if line.is_empty() {
        return Line::Blank;
    }

    let parsed: IResult<&str, Line> = alt((
        map(metadata("sent_id"), Line::SentId),
        map(metadata("text"), Line::Text),
        map(preceded(char('#'), rest), |_| Line::Comment),
        map(columns, Line::Token),
    ))(line);

    match parsed {
        Ok((_, classified)) => classified,
        // `columns` accepts any non-empty input, so this is unreachable in practice
        Err(_) => Line::Comment,
    }
}
