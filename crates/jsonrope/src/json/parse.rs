//! JSON text consumption.
//!
//! Recursive descent re-expressed over an explicit frame stack, for the same
//! reason the exporter uses one: nesting depth is attacker-controlled and
//! must not translate into native stack frames. The reviver walk after a
//! successful parse uses the same technique.

use std::{cell::RefCell, mem, rc::Rc};

use indexmap::IndexMap;

use super::escape::{HexQuad, HexStep};
use crate::{
    error::{Error, ParseError},
    object::{Object, PropKey, holder_delete, holder_get, holder_set, own_keys_of},
    runtime::Runtime,
    string::{Str, StrBuilder, Units},
    value::Value,
};

/// Parses one JSON value from `text` and optionally runs the reviver walk.
pub(crate) fn parse_text(
    rt: &Runtime,
    text: &Str,
    reviver: Option<&Value>,
) -> Result<Value, Error> {
    let mut parser = Parser {
        rt,
        text,
        units: text.units(),
        pos: 0,
    };
    let root = parser.parse_root()?;
    match reviver {
        // Non-callable revivers are ignored, as JSON semantics require.
        Some(reviver) if reviver.is_callable() => revive(rt, root, reviver),
        _ => Ok(root),
    }
}

const QUOTE: u16 = b'"' as u16;
const BACKSLASH: u16 = b'\\' as u16;
const COMMA: u16 = b',' as u16;
const COLON: u16 = b':' as u16;
const MINUS: u16 = b'-' as u16;
const PLUS: u16 = b'+' as u16;
const DOT: u16 = b'.' as u16;
const LBRACE: u16 = b'{' as u16;
const RBRACE: u16 = b'}' as u16;
const LBRACKET: u16 = b'[' as u16;
const RBRACKET: u16 = b']' as u16;

fn is_ws(unit: u16) -> bool {
    matches!(unit, 0x20 | 0x09 | 0x0A | 0x0D)
}

fn is_digit(unit: u16) -> bool {
    (0x30..=0x39).contains(&unit)
}

enum Frame {
    Array(Vec<Value>),
    Object {
        props: IndexMap<PropKey, Value>,
        pending: PropKey,
    },
}

struct Parser<'a> {
    rt: &'a Runtime,
    text: &'a Str,
    units: Units,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<u16> {
        self.units.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u16> {
        let unit = self.peek()?;
        self.pos += 1;
        Some(unit)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(is_ws) {
            self.pos += 1;
        }
    }

    fn error(&self, message: &'static str) -> Error {
        self.error_at(message, self.pos)
    }

    /// Builds a syntax error with up to seven code units of context from
    /// `offset`, stopping early at whitespace.
    fn error_at(&self, message: &'static str, offset: usize) -> Error {
        let mut context = String::new();
        for &unit in self.units.iter().skip(offset).take(7) {
            if is_ws(unit) {
                break;
            }
            context.push(char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER));
        }
        Error::Syntax(ParseError {
            message,
            context,
            offset,
        })
    }

    fn parse_root(&mut self) -> Result<Value, Error> {
        self.skip_ws();
        let value = self.parse_document()?;
        self.skip_ws();
        if self.pos < self.units.len() {
            return Err(self.error("more than a single value"));
        }
        Ok(value)
    }

    fn parse_document(&mut self) -> Result<Value, Error> {
        let mut stack: Vec<Frame> = Vec::new();
        'value: loop {
            self.skip_ws();
            let mut current = match self.peek() {
                None => return Err(self.error("unexpected end of input")),
                Some(LBRACE) => {
                    self.pos += 1;
                    self.skip_ws();
                    if self.peek() == Some(RBRACE) {
                        self.pos += 1;
                        Value::Object(Object::new().into_ref())
                    } else {
                        let pending = self.parse_key()?;
                        stack.push(Frame::Object {
                            props: IndexMap::new(),
                            pending,
                        });
                        continue 'value;
                    }
                }
                Some(LBRACKET) => {
                    self.pos += 1;
                    self.skip_ws();
                    if self.peek() == Some(RBRACKET) {
                        self.pos += 1;
                        Value::Array(Rc::new(RefCell::new(Vec::new())))
                    } else {
                        stack.push(Frame::Array(Vec::new()));
                        continue 'value;
                    }
                }
                Some(QUOTE) => Value::String(self.parse_string()?),
                Some(unit) if unit == MINUS || is_digit(unit) => {
                    Value::Number(self.parse_number()?)
                }
                Some(0x74) => {
                    self.expect_literal("true")?;
                    Value::Boolean(true)
                }
                Some(0x66) => {
                    self.expect_literal("false")?;
                    Value::Boolean(false)
                }
                Some(0x6E) => {
                    self.expect_literal("null")?;
                    Value::Null
                }
                Some(_) => return Err(self.error("unexpected character")),
            };
            // One value is complete; attach it upward, closing as many
            // containers as this value finishes.
            loop {
                match stack.last_mut() {
                    None => return Ok(current),
                    Some(Frame::Array(elems)) => {
                        elems.push(current);
                        self.skip_ws();
                        match self.bump() {
                            Some(COMMA) => {
                                self.skip_ws();
                                if self.peek() == Some(RBRACKET) {
                                    return Err(self.error("superfluous trailing comma"));
                                }
                                continue 'value;
                            }
                            Some(RBRACKET) => {
                                let elems = mem::take(elems);
                                stack.pop();
                                current = Value::Array(Rc::new(RefCell::new(elems)));
                            }
                            Some(_) => {
                                return Err(self.error_at("expected ',' or ']'", self.pos - 1));
                            }
                            None => return Err(self.error("unexpected end of input")),
                        }
                    }
                    Some(Frame::Object { props, pending }) => {
                        props.insert(pending.clone(), current);
                        self.skip_ws();
                        match self.bump() {
                            Some(COMMA) => {
                                self.skip_ws();
                                if self.peek() == Some(RBRACE) {
                                    return Err(self.error("superfluous trailing comma"));
                                }
                                *pending = self.parse_key()?;
                                continue 'value;
                            }
                            Some(RBRACE) => {
                                let props = mem::take(props);
                                stack.pop();
                                current = Value::Object(Object::from_props(props).into_ref());
                            }
                            Some(_) => {
                                return Err(self.error_at("expected ',' or '}'", self.pos - 1));
                            }
                            None => return Err(self.error("unexpected end of input")),
                        }
                    }
                }
            }
        }
    }

    fn parse_key(&mut self) -> Result<PropKey, Error> {
        self.skip_ws();
        match self.peek() {
            Some(QUOTE) => {}
            Some(_) => return Err(self.error("expected property name")),
            None => return Err(self.error("unexpected end of input")),
        }
        let name = self.parse_string()?;
        self.skip_ws();
        match self.bump() {
            Some(COLON) => Ok(PropKey::from_name(&name)),
            Some(_) => Err(self.error_at("expected ':'", self.pos - 1)),
            None => Err(self.error("unexpected end of input")),
        }
    }

    /// String literal. The fast path is zero-copy: an escape-free literal
    /// becomes a substring view of the input text.
    fn parse_string(&mut self) -> Result<Str, Error> {
        debug_assert_eq!(self.peek(), Some(QUOTE));
        self.pos += 1;
        let start = self.pos;
        loop {
            match self.peek() {
                None => return Err(self.error_at("unterminated string", start - 1)),
                Some(QUOTE) => {
                    let s = self.text.substring(self.rt, start, self.pos - start);
                    self.pos += 1;
                    return Ok(s);
                }
                Some(BACKSLASH) => return self.parse_string_slow(start),
                Some(unit) if unit < 0x20 => {
                    return Err(self.error("unescaped control character"));
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    /// Buffered continuation once the first escape is seen: copies the clean
    /// prefix, then decodes escape by escape.
    fn parse_string_slow(&mut self, start: usize) -> Result<Str, Error> {
        let mut buf = StrBuilder::with_capacity(self.pos - start + 8);
        buf.push_units(&self.units[start..self.pos]);
        loop {
            match self.bump() {
                None => return Err(self.error_at("unterminated string", start - 1)),
                Some(QUOTE) => return Ok(buf.finish(self.rt)),
                Some(BACKSLASH) => {
                    let escape_start = self.pos - 1;
                    match self.bump() {
                        None => return Err(self.error_at("unterminated string", start - 1)),
                        Some(0x22) => buf.push_unit(0x22),
                        Some(0x5C) => buf.push_unit(0x5C),
                        Some(0x2F) => buf.push_unit(0x2F),
                        Some(0x62) => buf.push_unit(0x08),
                        Some(0x66) => buf.push_unit(0x0C),
                        Some(0x6E) => buf.push_unit(0x0A),
                        Some(0x72) => buf.push_unit(0x0D),
                        Some(0x74) => buf.push_unit(0x09),
                        Some(0x75) => {
                            let mut quad = HexQuad::new();
                            loop {
                                match self.bump() {
                                    None => {
                                        return Err(
                                            self.error_at("unterminated string", start - 1)
                                        );
                                    }
                                    Some(unit) => match quad.step(unit) {
                                        HexStep::NeedMore => {}
                                        HexStep::Done(decoded) => {
                                            buf.push_unit(decoded);
                                            break;
                                        }
                                        HexStep::Reject => {
                                            return Err(self.error_at(
                                                "invalid unicode escape",
                                                escape_start,
                                            ));
                                        }
                                    },
                                }
                            }
                        }
                        Some(_) => {
                            return Err(self.error_at("invalid escape sequence", escape_start));
                        }
                    }
                }
                Some(unit) if unit < 0x20 => {
                    return Err(self.error_at("unescaped control character", self.pos - 1));
                }
                Some(unit) => buf.push_unit(unit),
            }
        }
    }

    /// Number literal, with JSON's grammar enforced up front: no leading
    /// zeros, no bare decimal points, exponents need at least one digit.
    fn parse_number(&mut self) -> Result<f64, Error> {
        let start = self.pos;
        let negative = self.peek() == Some(MINUS);
        if negative {
            self.pos += 1;
        }
        let mut int_digits = 0usize;
        match self.peek() {
            Some(0x30) => {
                self.pos += 1;
                int_digits = 1;
                if self.peek().is_some_and(is_digit) {
                    return Err(self.error_at("leading zero in number", start));
                }
            }
            Some(unit) if is_digit(unit) => {
                while self.peek().is_some_and(is_digit) {
                    self.pos += 1;
                    int_digits += 1;
                }
            }
            _ => return Err(self.error_at("digit expected", self.pos)),
        }
        let mut integral = true;
        if self.peek() == Some(DOT) {
            integral = false;
            self.pos += 1;
            if !self.peek().is_some_and(is_digit) {
                return Err(self.error("digit expected after decimal point"));
            }
            while self.peek().is_some_and(is_digit) {
                self.pos += 1;
            }
        }
        if matches!(self.peek(), Some(0x65 | 0x45)) {
            integral = false;
            self.pos += 1;
            if matches!(self.peek(), Some(PLUS | MINUS)) {
                self.pos += 1;
            }
            if !self.peek().is_some_and(is_digit) {
                return Err(self.error("digit expected in exponent"));
            }
            while self.peek().is_some_and(is_digit) {
                self.pos += 1;
            }
        }
        let lexeme = &self.units[start..self.pos];
        // Fast path: integers of at most nine digits never touch the float
        // parser.
        if integral && int_digits <= 9 {
            let mut acc: u32 = 0;
            for &unit in &lexeme[usize::from(negative)..] {
                acc = acc * 10 + u32::from(unit - 0x30);
            }
            let n = f64::from(acc);
            return Ok(if negative { -n } else { n });
        }
        let ascii: String = lexeme.iter().map(|&unit| char::from(unit as u8)).collect();
        ascii
            .parse::<f64>()
            .map_err(|_| self.error_at("invalid number", start))
    }

    fn expect_literal(&mut self, literal: &'static str) -> Result<(), Error> {
        let start = self.pos;
        for byte in literal.bytes() {
            if self.bump() != Some(u16::from(byte)) {
                return Err(self.error_at("unexpected character", start));
            }
        }
        Ok(())
    }
}

struct WalkFrame {
    holder: Value,
    keys: Vec<PropKey>,
    index: usize,
    descended: bool,
}

/// The reviver walk: bottom-up over a synthetic `{"": root}` holder, again
/// with an explicit frame stack. Children are revived before their holder's
/// key is; a reviver returning `Undefined` deletes the property.
fn revive(rt: &Runtime, root: Value, reviver: &Value) -> Result<Value, Error> {
    let root_key = PropKey::Name(rt.interner().empty());
    let mut top = Object::new();
    top.set(root_key.clone(), root);
    let holder = Value::Object(top.into_ref());

    let mut stack = vec![WalkFrame {
        holder: holder.clone(),
        keys: vec![root_key.clone()],
        index: 0,
        descended: false,
    }];
    while let Some(frame) = stack.last_mut() {
        if frame.descended {
            // The composite at keys[index] has been fully walked.
            frame.descended = false;
            let key = frame.keys[frame.index].clone();
            let frame_holder = frame.holder.clone();
            frame.index += 1;
            apply_reviver(rt, reviver, &frame_holder, &key)?;
            continue;
        }
        if frame.index == frame.keys.len() {
            stack.pop();
            continue;
        }
        let key = frame.keys[frame.index].clone();
        let value = holder_get(&frame.holder, &key);
        if value.is_composite() {
            frame.descended = true;
            let keys = own_keys_of(&value);
            stack.push(WalkFrame {
                holder: value,
                keys,
                index: 0,
                descended: false,
            });
        } else {
            let frame_holder = frame.holder.clone();
            frame.index += 1;
            apply_reviver(rt, reviver, &frame_holder, &key)?;
        }
    }
    Ok(holder_get(&holder, &root_key))
}

fn apply_reviver(
    rt: &Runtime,
    reviver: &Value,
    holder: &Value,
    key: &PropKey,
) -> Result<(), Error> {
    let value = holder_get(holder, key);
    let key_str = Value::String(rt.prop_key_str(key));
    let result = rt.invoke(reviver, holder, &[key_str, value])?;
    if result.is_undefined() {
        holder_delete(holder, key);
    } else {
        holder_set(holder, key, result);
    }
    Ok(())
}
