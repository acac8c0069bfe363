use std::str::FromStr;

use nom::branch::alt;
use nom::bytes::complete::{tag, take_while};
use nom::character::complete::{char, digit1, multispace0, satisfy};
use nom::combinator::{map, map_res, opt, recognize};
use nom::sequence::{delimited, pair, preceded};
use nom::IResult;

use crate::formula::{Identifier, Reference};

/// Lexeme shaped like an identifier, without validating it into one.
pub fn word(input: &str) -> IResult<&str, &str> {
    let mut parser = recognize(pair(satisfy(Identifier::is_start), take_while(Identifier::is_continue)));
    parser(input)
}

pub fn identifier(input: &str) -> IResult<&str, Identifier> {
    let mut parser = map_res(word, |name: &str| Identifier::new(name));
    parser(input)
}

/// Keyword parsed through the [`FromStr`] impl of its enum, e.g. `before_sunrise`.
pub fn keyword<T: FromStr>(input: &str) -> IResult<&str, T> {
    let mut parser = map_res(word, T::from_str);
    parser(input)
}

/// `@identifier`, yielding the key without its marker.
pub fn zman_key(input: &str) -> IResult<&str, Identifier> {
    let mut parser = preceded(char('@'), identifier);
    parser(input)
}

pub fn reference(input: &str) -> IResult<&str, Reference> {
    let zman = map(zman_key, Reference::Zman);
    let event = map(identifier, Reference::Event);

    let mut parser = alt((zman, event));
    parser(input)
}

/// Unsigned decimal number, `digit+ ("." digit+)?`.
pub fn number(input: &str) -> IResult<&str, f64> {
    let fraction = pair(char('.'), digit1);
    let mut parser = map_res(recognize(pair(digit1, opt(fraction))), f64::from_str);

    parser(input)
}

pub fn op0<'a>(op: &'a str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    move |input: &'a str| -> IResult<&'a str, &'a str> {
        let mut parser = delimited(multispace0, tag(op), multispace0);
        parser(input)
    }
}

/// Collect every distinct `@key` mentioned anywhere in `text`, in order of first appearance.
///
/// Works on arbitrary source, including formulas the guided editor cannot represent.
pub fn scan_references(text: &str) -> Vec<Identifier> {
    let mut found: Vec<Identifier> = Vec::new();
    let mut rest = text;

    while let Some(at) = rest.find('@') {
        rest = &rest[at..];

        match zman_key(rest) {
            Ok((after, key)) => {
                if !found.contains(&key) {
                    found.push(key);
                }
                rest = after;
            }
            Err(_) => rest = &rest[1..],
        }
    }

    found
}
