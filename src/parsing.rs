use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, space0, space1, u32},
    combinator::{eof, value},
    number::complete::double,
    sequence::{preceded, terminated},
    IResult,
};

pub(crate) fn double_entry(line: &str) -> IResult<&str, f64> {
    preceded(space1, double)(line)
}

pub(crate) fn any_entry(line: &str) -> IResult<&str, &str> {
    preceded(space1, non_space)(line)
}

pub(crate) fn u32_entry(line: &str) -> IResult<&str, u32> {
    preceded(space1, u32)(line)
}

pub(crate) fn flag_entry(line: &str) -> IResult<&str, bool> {
    preceded(space1, alt((value(true, char('1')), value(false, char('0')))))(
        line,
    )
}

/// Succeeds if only whitespace is left
pub(crate) fn line_end(line: &str) -> IResult<&str, &str> {
    terminated(space0, eof)(line)
}

pub(crate) fn non_space(line: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_ascii_whitespace())(line)
}
