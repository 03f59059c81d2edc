//! A small backtracking parser-combinator engine.
//!
//! A parser is anything implementing [`Parser`]; every function or closure of
//! shape `Fn(Cursor<'a>) -> ParseResult<'a, O>` already is one, so grammar
//! rules can be written as plain functions that refer to each other
//! recursively.
//!
//! Failures are ordinary values. A success also carries the furthest failure
//! that was recovered from while producing it (`Parsed::furthest`), so that
//! when parsing eventually fails the error can point at the deepest position
//! any alternative reached rather than wherever the last backtrack landed.
//!
//! Backtracking is not memoized. That is fine for a grammar of this size; a
//! bigger grammar would want a cache keyed by (rule, offset).

use log::trace;

use super::Expected;

/// An immutable position in the source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor<'a> {
    source: &'a str,
    offset: usize,
}

impl<'a> Cursor<'a> {
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Cursor { source, offset: 0 }
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// The unconsumed remainder of the source.
    #[must_use]
    pub fn rest(&self) -> &'a str {
        &self.source[self.offset..]
    }

    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.offset >= self.source.len()
    }

    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Splits `len` bytes off the front. `len` must fall on a char boundary.
    fn take(self, len: usize) -> (&'a str, Self) {
        let taken = &self.source[self.offset..self.offset + len];
        (
            taken,
            Cursor {
                offset: self.offset + len,
                ..self
            },
        )
    }

    /// The text between `self` and a later cursor over the same source.
    fn slice_to(self, end: Cursor<'a>) -> &'a str {
        &self.source[self.offset..end.offset]
    }

    /// Skips whitespace and `//` line comments.
    #[must_use]
    pub fn skip_trivia(self) -> Self {
        let mut cursor = self;
        loop {
            let rest = cursor.rest();
            let trimmed = rest.trim_start();
            cursor.offset += rest.len() - trimmed.len();

            if trimmed.starts_with("//") {
                cursor.offset += trimmed.find('\n').unwrap_or_else(|| trimmed.len());
            } else {
                return cursor;
            }
        }
    }

    fn preview(&self) -> &'a str {
        let rest = self.rest();
        match rest.char_indices().nth(20) {
            Some((end, _)) => &rest[..end],
            None => rest,
        }
    }
}

/// A parser that could not match at `position`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Failure {
    pub position: usize,
    pub expected: Expected,
}

impl Failure {
    #[must_use]
    pub fn new(position: usize, expected: Expected) -> Self {
        Failure { position, expected }
    }

    /// Keeps whichever failure got further. On a tie `other` wins, so the most
    /// recently tried alternative describes the error.
    #[must_use]
    pub fn furthest(self, other: Failure) -> Failure {
        if other.position >= self.position {
            other
        } else {
            self
        }
    }
}

fn merge(hint: Option<Failure>, other: Option<Failure>) -> Option<Failure> {
    match (hint, other) {
        (Some(a), Some(b)) => Some(a.furthest(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

fn merge_failure(hint: Option<Failure>, failure: Failure) -> Failure {
    match hint {
        Some(h) => h.furthest(failure),
        None => failure,
    }
}

/// A successful parse: the value, where parsing stopped, and the furthest
/// failure that was backtracked over on the way.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parsed<'a, O> {
    pub value: O,
    pub rest: Cursor<'a>,
    pub furthest: Option<Failure>,
}

impl<'a, O> Parsed<'a, O> {
    #[must_use]
    pub fn new(value: O, rest: Cursor<'a>) -> Self {
        Parsed {
            value,
            rest,
            furthest: None,
        }
    }

    fn with_hint(self, hint: Option<Failure>) -> Self {
        Parsed {
            furthest: merge(hint, self.furthest),
            ..self
        }
    }

    pub fn map<U, F: FnOnce(O) -> U>(self, f: F) -> Parsed<'a, U> {
        Parsed {
            value: f(self.value),
            rest: self.rest,
            furthest: self.furthest,
        }
    }
}

pub type ParseResult<'a, O> = Result<Parsed<'a, O>, Failure>;

pub trait Parser<'a, O> {
    fn parse(&self, cursor: Cursor<'a>) -> ParseResult<'a, O>;
}

impl<'a, O, F> Parser<'a, O> for F
where
    F: Fn(Cursor<'a>) -> ParseResult<'a, O>,
{
    fn parse(&self, cursor: Cursor<'a>) -> ParseResult<'a, O> {
        self(cursor)
    }
}

/// Matches `text` exactly.
pub fn literal<'a>(text: &'static str) -> impl Fn(Cursor<'a>) -> ParseResult<'a, &'a str> {
    move |cursor: Cursor<'a>| {
        if cursor.rest().starts_with(text) {
            let (matched, rest) = cursor.take(text.len());
            Ok(Parsed::new(matched, rest))
        } else {
            Err(Failure::new(cursor.offset(), Expected::Literal(text)))
        }
    }
}

/// Matches a single character accepted by `predicate`.
pub fn satisfy<'a, F>(
    predicate: F,
    name: &'static str,
) -> impl Fn(Cursor<'a>) -> ParseResult<'a, &'a str>
where
    F: Fn(char) -> bool,
{
    move |cursor: Cursor<'a>| match cursor.peek() {
        Some(c) if predicate(c) => {
            let (matched, rest) = cursor.take(c.len_utf8());
            Ok(Parsed::new(matched, rest))
        }
        _ => Err(Failure::new(cursor.offset(), Expected::Construct(name))),
    }
}

/// Matches the longest non-empty run of characters accepted by `predicate`.
pub fn charclass<'a, F>(
    predicate: F,
    name: &'static str,
) -> impl Fn(Cursor<'a>) -> ParseResult<'a, &'a str>
where
    F: Fn(char) -> bool,
{
    move |cursor: Cursor<'a>| {
        let rest = cursor.rest();
        let len = rest
            .char_indices()
            .find(|&(_, c)| !predicate(c))
            .map_or(rest.len(), |(i, _)| i);

        if len == 0 {
            return Err(Failure::new(cursor.offset(), Expected::Construct(name)));
        }

        let (matched, rest) = cursor.take(len);
        Ok(Parsed::new(matched, rest))
    }
}

/// Yields the current offset without consuming anything.
pub fn position<'a>() -> impl Fn(Cursor<'a>) -> ParseResult<'a, usize> {
    move |cursor: Cursor<'a>| Ok(Parsed::new(cursor.offset(), cursor))
}

/// Succeeds only once everything but trivia has been consumed.
pub fn end_of_input<'a>() -> impl Fn(Cursor<'a>) -> ParseResult<'a, ()> {
    move |cursor: Cursor<'a>| {
        let cursor = cursor.skip_trivia();
        if cursor.is_at_end() {
            Ok(Parsed::new((), cursor))
        } else {
            Err(Failure::new(cursor.offset(), Expected::EndOfInput))
        }
    }
}

/// Skips whitespace and comments, then runs `parser`.
pub fn padded<'a, O, P>(parser: P) -> impl Fn(Cursor<'a>) -> ParseResult<'a, O>
where
    P: Parser<'a, O>,
{
    move |cursor: Cursor<'a>| parser.parse(cursor.skip_trivia())
}

/// A literal token with leading trivia skipped.
pub fn symbol<'a>(text: &'static str) -> impl Fn(Cursor<'a>) -> ParseResult<'a, &'a str> {
    padded(literal(text))
}

/// Like `symbol`, but refuses to match a prefix of a longer identifier, so
/// `iffy` is not read as `if` followed by `fy`.
pub fn keyword<'a>(word: &'static str) -> impl Fn(Cursor<'a>) -> ParseResult<'a, &'a str> {
    move |cursor: Cursor<'a>| {
        let start = cursor.skip_trivia();
        let parsed = literal(word).parse(start)?;
        match parsed.rest.peek() {
            Some(c) if continues_identifier(c) => {
                Err(Failure::new(start.offset(), Expected::Literal(word)))
            }
            _ => Ok(parsed),
        }
    }
}

#[must_use]
pub fn continues_identifier(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

pub fn map<'a, O, U, P, F>(parser: P, f: F) -> impl Fn(Cursor<'a>) -> ParseResult<'a, U>
where
    P: Parser<'a, O>,
    F: Fn(O) -> U,
{
    move |cursor: Cursor<'a>| parser.parse(cursor).map(|parsed| parsed.map(&f))
}

/// Like `map`, but `f` may reject the value. A rejection fails at the
/// position the parser started from.
pub fn try_map<'a, O, U, P, F>(parser: P, f: F) -> impl Fn(Cursor<'a>) -> ParseResult<'a, U>
where
    P: Parser<'a, O>,
    F: Fn(O) -> Result<U, Expected>,
{
    move |cursor: Cursor<'a>| {
        let parsed = parser.parse(cursor)?;
        let Parsed {
            value,
            rest,
            furthest,
        } = parsed;

        match f(value) {
            Ok(value) => Ok(Parsed {
                value,
                rest,
                furthest,
            }),
            Err(expected) => Err(merge_failure(
                furthest,
                Failure::new(cursor.offset(), expected),
            )),
        }
    }
}

/// Yields the source text consumed by `parser` instead of its value.
pub fn recognize<'a, O, P>(parser: P) -> impl Fn(Cursor<'a>) -> ParseResult<'a, &'a str>
where
    P: Parser<'a, O>,
{
    move |cursor: Cursor<'a>| {
        let parsed = parser.parse(cursor)?;
        let rest = parsed.rest;
        Ok(parsed.map(|_| cursor.slice_to(rest)))
    }
}

/// Never fails: yields `None` and consumes nothing when `parser` fails.
pub fn optional<'a, O, P>(parser: P) -> impl Fn(Cursor<'a>) -> ParseResult<'a, Option<O>>
where
    P: Parser<'a, O>,
{
    move |cursor: Cursor<'a>| match parser.parse(cursor) {
        Ok(parsed) => Ok(parsed.map(Some)),
        Err(failure) => Ok(Parsed {
            value: None,
            rest: cursor,
            furthest: Some(failure),
        }),
    }
}

// Greedily applies `parser` from `cursor`, appending to `values`. Stops at the
// first failure or at a success that consumed nothing.
fn repeat<'a, O, P>(
    parser: &P,
    mut cursor: Cursor<'a>,
    mut values: Vec<O>,
    mut furthest: Option<Failure>,
) -> Parsed<'a, Vec<O>>
where
    P: Parser<'a, O>,
{
    loop {
        match parser.parse(cursor) {
            Ok(parsed) => {
                furthest = merge(furthest, parsed.furthest);
                if parsed.rest.offset() == cursor.offset() {
                    break;
                }
                cursor = parsed.rest;
                values.push(parsed.value);
            }
            Err(failure) => {
                furthest = merge(furthest, Some(failure));
                break;
            }
        }
    }

    Parsed {
        value: values,
        rest: cursor,
        furthest,
    }
}

/// Zero or more repetitions.
pub fn many0<'a, O, P>(parser: P) -> impl Fn(Cursor<'a>) -> ParseResult<'a, Vec<O>>
where
    P: Parser<'a, O>,
{
    move |cursor: Cursor<'a>| Ok(repeat(&parser, cursor, Vec::new(), None))
}

/// One or more repetitions.
pub fn many1<'a, O, P>(parser: P) -> impl Fn(Cursor<'a>) -> ParseResult<'a, Vec<O>>
where
    P: Parser<'a, O>,
{
    move |cursor: Cursor<'a>| {
        let first = parser.parse(cursor)?;
        Ok(repeat(&parser, first.rest, vec![first.value], first.furthest))
    }
}

/// Zero or more `item`s separated by `separator`. A trailing separator is
/// left unconsumed.
pub fn separated0<'a, O, S, P, Q>(
    item: P,
    separator: Q,
) -> impl Fn(Cursor<'a>) -> ParseResult<'a, Vec<O>>
where
    P: Parser<'a, O>,
    Q: Parser<'a, S>,
{
    move |cursor: Cursor<'a>| {
        let first = match item.parse(cursor) {
            Ok(parsed) => parsed,
            Err(failure) => {
                return Ok(Parsed {
                    value: Vec::new(),
                    rest: cursor,
                    furthest: Some(failure),
                })
            }
        };

        let mut values = vec![first.value];
        let mut cursor = first.rest;
        let mut furthest = first.furthest;

        loop {
            let next = separator
                .parse(cursor)
                .and_then(|sep| Ok(item.parse(sep.rest)?.with_hint(sep.furthest)));

            match next {
                Ok(parsed) => {
                    furthest = merge(furthest, parsed.furthest);
                    cursor = parsed.rest;
                    values.push(parsed.value);
                }
                Err(failure) => {
                    furthest = merge(furthest, Some(failure));
                    break;
                }
            }
        }

        Ok(Parsed {
            value: values,
            rest: cursor,
            furthest,
        })
    }
}

/// Runs `first` then `second`, keeping the second value.
pub fn preceded<'a, A, B, P, Q>(first: P, second: Q) -> impl Fn(Cursor<'a>) -> ParseResult<'a, B>
where
    P: Parser<'a, A>,
    Q: Parser<'a, B>,
{
    map(sequence((first, second)), |(_, b)| b)
}

/// Runs `first` then `second`, keeping the first value.
pub fn terminated<'a, A, B, P, Q>(first: P, second: Q) -> impl Fn(Cursor<'a>) -> ParseResult<'a, A>
where
    P: Parser<'a, A>,
    Q: Parser<'a, B>,
{
    map(sequence((first, second)), |(a, _)| a)
}

/// Runs `open`, `inner`, `close`, keeping the inner value.
pub fn delimited<'a, A, B, C, P, Q, R>(
    open: P,
    inner: Q,
    close: R,
) -> impl Fn(Cursor<'a>) -> ParseResult<'a, B>
where
    P: Parser<'a, A>,
    Q: Parser<'a, B>,
    R: Parser<'a, C>,
{
    map(sequence((open, inner, close)), |(_, b, _)| b)
}

/// If `parser` fails without getting past its first token, describe the
/// failure as `name` instead, unless the token was there but rejected
/// (`Expected::Valid`). Every attempt is traced at `trace` level.
pub fn label<'a, O, P>(parser: P, name: &'static str) -> impl Fn(Cursor<'a>) -> ParseResult<'a, O>
where
    P: Parser<'a, O>,
{
    move |cursor: Cursor<'a>| {
        trace!("trying {} at {}: {:?}", name, cursor.offset(), cursor.preview());

        match parser.parse(cursor) {
            Ok(parsed) => {
                trace!(
                    "{} matched {}..{}",
                    name,
                    cursor.offset(),
                    parsed.rest.offset()
                );
                Ok(parsed)
            }
            Err(failure) => {
                trace!(
                    "{} failed at {}: expected {}",
                    name,
                    failure.position,
                    failure.expected
                );

                let start = cursor.skip_trivia().offset();
                let rejected = matches!(failure.expected, Expected::Valid(_));
                if failure.position <= start && !rejected {
                    Err(Failure::new(start, Expected::Construct(name)))
                } else {
                    Err(failure)
                }
            }
        }
    }
}

/// A tuple of parsers run one after another.
pub trait Sequence<'a, O> {
    fn parse_sequence(&self, cursor: Cursor<'a>) -> ParseResult<'a, O>;
}

macro_rules! sequence_impl {
    ($($parser:ident $output:ident $binding:ident $value:ident),+) => {
        impl<'a, $($parser, $output),+> Sequence<'a, ($($output,)+)> for ($($parser,)+)
        where
            $($parser: Parser<'a, $output>),+
        {
            fn parse_sequence(&self, start: Cursor<'a>) -> ParseResult<'a, ($($output,)+)> {
                let ($($binding,)+) = self;
                let mut cursor = start;
                let mut furthest = None;

                $(
                    let $value = match $binding.parse(cursor) {
                        Ok(parsed) => {
                            cursor = parsed.rest;
                            furthest = merge(furthest, parsed.furthest);
                            parsed.value
                        }
                        Err(failure) => return Err(merge_failure(furthest, failure)),
                    };
                )+

                Ok(Parsed {
                    value: ($($value,)+),
                    rest: cursor,
                    furthest,
                })
            }
        }
    };
}

sequence_impl!(P1 O1 p1 v1, P2 O2 p2 v2);
sequence_impl!(P1 O1 p1 v1, P2 O2 p2 v2, P3 O3 p3 v3);
sequence_impl!(P1 O1 p1 v1, P2 O2 p2 v2, P3 O3 p3 v3, P4 O4 p4 v4);
sequence_impl!(P1 O1 p1 v1, P2 O2 p2 v2, P3 O3 p3 v3, P4 O4 p4 v4, P5 O5 p5 v5);
sequence_impl!(P1 O1 p1 v1, P2 O2 p2 v2, P3 O3 p3 v3, P4 O4 p4 v4, P5 O5 p5 v5, P6 O6 p6 v6);

/// All of `parsers`, in order, yielding a tuple of their values. A failure
/// anywhere fails the whole sequence and nothing is consumed.
pub fn sequence<'a, O, S>(parsers: S) -> impl Fn(Cursor<'a>) -> ParseResult<'a, O>
where
    S: Sequence<'a, O>,
{
    move |cursor: Cursor<'a>| parsers.parse_sequence(cursor)
}

/// A tuple of parsers tried in turn from the same cursor.
pub trait Alternatives<'a, O> {
    fn parse_alternatives(&self, cursor: Cursor<'a>) -> ParseResult<'a, O>;
}

macro_rules! alternatives_impl {
    ($first_parser:ident $first:ident $(, $parser:ident $binding:ident)+) => {
        impl<'a, O, $first_parser, $($parser),+> Alternatives<'a, O>
            for ($first_parser, $($parser,)+)
        where
            $first_parser: Parser<'a, O>,
            $($parser: Parser<'a, O>),+
        {
            fn parse_alternatives(&self, cursor: Cursor<'a>) -> ParseResult<'a, O> {
                let ($first, $($binding,)+) = self;

                let mut failure = match $first.parse(cursor) {
                    Ok(parsed) => return Ok(parsed),
                    Err(failure) => failure,
                };

                $(
                    match $binding.parse(cursor) {
                        Ok(parsed) => return Ok(parsed.with_hint(Some(failure))),
                        Err(next) => failure = failure.furthest(next),
                    }
                )+

                Err(failure)
            }
        }
    };
}

alternatives_impl!(P1 p1, P2 p2);
alternatives_impl!(P1 p1, P2 p2, P3 p3);
alternatives_impl!(P1 p1, P2 p2, P3 p3, P4 p4);
alternatives_impl!(P1 p1, P2 p2, P3 p3, P4 p4, P5 p5);
alternatives_impl!(P1 p1, P2 p2, P3 p3, P4 p4, P5 p5, P6 p6);

/// The first of `parsers` that succeeds. If none does, the failure that got
/// furthest is returned, ties going to the later alternative.
pub fn alt<'a, O, A>(parsers: A) -> impl Fn(Cursor<'a>) -> ParseResult<'a, O>
where
    A: Alternatives<'a, O>,
{
    move |cursor: Cursor<'a>| parsers.parse_alternatives(cursor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits<'a>() -> impl Fn(Cursor<'a>) -> ParseResult<'a, &'a str> {
        charclass(|c| c.is_ascii_digit(), "digits")
    }

    #[test]
    fn it_matches_a_literal_and_advances() {
        let parsed = literal("fn").parse(Cursor::new("fn main")).unwrap();
        assert_eq!("fn", parsed.value);
        assert_eq!(2, parsed.rest.offset());
        assert_eq!(" main", parsed.rest.rest());
    }

    #[test]
    fn it_fails_a_literal_without_consuming() {
        assert_eq!(
            Err(Failure::new(0, Expected::Literal("fn"))),
            literal("fn").parse(Cursor::new("fun"))
        );
    }

    #[test]
    fn it_takes_a_maximal_charclass_run() {
        let parsed = digits().parse(Cursor::new("1234abc")).unwrap();
        assert_eq!("1234", parsed.value);
        assert_eq!("abc", parsed.rest.rest());
    }

    #[test]
    fn it_requires_at_least_one_charclass_match() {
        assert_eq!(
            Err(Failure::new(0, Expected::Construct("digits"))),
            digits().parse(Cursor::new("abc"))
        );
    }

    #[test]
    fn it_skips_whitespace_and_comments() {
        let parsed = symbol("{")
            .parse(Cursor::new("  // open a block\n\t {"))
            .unwrap();
        assert!(parsed.rest.is_at_end());
    }

    #[test]
    fn it_rolls_back_a_failed_sequence() {
        let parser = sequence((symbol("a"), symbol("b"), symbol("c")));
        assert_eq!(
            Err(Failure::new(4, Expected::Literal("c"))),
            parser.parse(Cursor::new("a b d"))
        );

        let parser = alt((
            map(sequence((symbol("a"), symbol("b"), symbol("c"))), |_| 1),
            map(sequence((symbol("a"), symbol("b"))), |_| 2),
        ));
        let parsed = parser.parse(Cursor::new("a b d")).unwrap();
        assert_eq!(2, parsed.value);
        assert_eq!(3, parsed.rest.offset());
    }

    #[test]
    fn it_reports_the_furthest_failing_alternative() {
        let parser = alt((
            map(sequence((symbol("a"), symbol("b"), symbol("c"))), |_| ()),
            map(symbol("x"), |_| ()),
        ));
        assert_eq!(
            Err(Failure::new(4, Expected::Literal("c"))),
            parser.parse(Cursor::new("a b d"))
        );
    }

    #[test]
    fn it_breaks_ties_with_the_last_alternative() {
        let parser = alt((symbol("x"), symbol("y")));
        assert_eq!(
            Err(Failure::new(0, Expected::Literal("y"))),
            parser.parse(Cursor::new("z"))
        );
    }

    #[test]
    fn it_repeats_greedily() {
        let parsed = many0(symbol("a")).parse(Cursor::new("a a a b")).unwrap();
        assert_eq!(3, parsed.value.len());
        assert_eq!(" b", parsed.rest.rest());

        let parsed = many0(symbol("a")).parse(Cursor::new("b")).unwrap();
        assert!(parsed.value.is_empty());
        assert_eq!(0, parsed.rest.offset());
    }

    #[test]
    fn it_requires_one_match_for_many1() {
        assert!(many1(symbol("a")).parse(Cursor::new("b")).is_err());
        assert_eq!(
            2,
            many1(symbol("a"))
                .parse(Cursor::new("aab"))
                .unwrap()
                .value
                .len()
        );
    }

    #[test]
    fn it_stops_repeating_when_nothing_is_consumed() {
        let parsed = many0(optional(symbol("a"))).parse(Cursor::new("b")).unwrap();
        assert!(parsed.value.is_empty());
    }

    #[test]
    fn it_never_fails_an_optional() {
        let parsed = optional(symbol("a")).parse(Cursor::new("b")).unwrap();
        assert_eq!(None, parsed.value);
        assert_eq!(0, parsed.rest.offset());
        assert_eq!(Some(Failure::new(0, Expected::Literal("a"))), parsed.furthest);
    }

    #[test]
    fn it_maps_successes_and_passes_failures_through() {
        let parser = map(digits(), |d: &str| d.len());
        assert_eq!(3, parser.parse(Cursor::new("123")).unwrap().value);
        assert_eq!(
            Err(Failure::new(0, Expected::Construct("digits"))),
            parser.parse(Cursor::new("x"))
        );
    }

    #[test]
    fn it_fails_a_rejected_try_map_at_its_start() {
        let parser = padded(try_map(digits(), |d: &str| {
            d.parse::<u8>().map_err(|_| Expected::Construct("byte"))
        }));
        assert_eq!(42, parser.parse(Cursor::new(" 42")).unwrap().value);
        assert_eq!(
            Err(Failure::new(1, Expected::Construct("byte"))),
            parser.parse(Cursor::new(" 300"))
        );
    }

    #[test]
    fn it_recognizes_consumed_text() {
        let parser = recognize(sequence((
            satisfy(char::is_alphabetic, "letter"),
            optional(digits()),
        )));
        assert_eq!("x12", parser.parse(Cursor::new("x12+")).unwrap().value);
    }

    #[test]
    fn it_separates_items_and_leaves_a_trailing_separator() {
        let parser = separated0(padded(digits()), symbol(","));
        let parsed = parser.parse(Cursor::new("1, 2 ,3,")).unwrap();
        assert_eq!(vec!["1", "2", "3"], parsed.value);
        assert_eq!(",", parsed.rest.rest());

        let parsed = parser.parse(Cursor::new(")")).unwrap();
        assert!(parsed.value.is_empty());
    }

    #[test]
    fn it_does_not_match_a_keyword_prefix() {
        assert!(keyword("if").parse(Cursor::new(" if (")).is_ok());
        assert_eq!(
            Err(Failure::new(1, Expected::Literal("if"))),
            keyword("if").parse(Cursor::new(" iffy"))
        );
    }

    #[test]
    fn it_relabels_failures_that_made_no_progress() {
        let parser = label(sequence((symbol("("), symbol(")"))), "unit");
        assert_eq!(
            Err(Failure::new(2, Expected::Construct("unit"))),
            parser.parse(Cursor::new("  x"))
        );
        assert_eq!(
            Err(Failure::new(3, Expected::Literal(")"))),
            parser.parse(Cursor::new("  (x"))
        );
    }

    #[test]
    fn it_does_not_relabel_rejected_values() {
        let byte = padded(try_map(digits(), |d: &str| {
            d.parse::<u8>().map_err(|_| Expected::Valid("byte"))
        }));
        assert_eq!(
            Err(Failure::new(1, Expected::Valid("byte"))),
            label(byte, "value").parse(Cursor::new(" 256"))
        );
    }

    #[test]
    fn it_keeps_the_furthest_failure_across_a_later_error() {
        // `many0` backs off from "+ ;" but remembers it got to the ';'.
        let term = label(padded(digits()), "term");
        let parser = terminated(
            sequence((padded(digits()), many0(preceded(symbol("+"), term)))),
            symbol(";"),
        );
        assert_eq!(
            Err(Failure::new(4, Expected::Construct("term"))),
            parser.parse(Cursor::new("1 + ;"))
        );
    }

    #[test]
    fn it_checks_for_end_of_input() {
        assert!(end_of_input().parse(Cursor::new("  // done\n")).is_ok());
        assert_eq!(
            Err(Failure::new(2, Expected::EndOfInput)),
            end_of_input().parse(Cursor::new("  x"))
        );
    }
}
