//! The tagged `Value` union and its total coercion functions.
//!
//! Mirrors the shape of a Zend `zval`: a small tag plus a payload, with
//! arrays and objects held behind reference-counted handles so assignment is
//! an O(1) pointer bump and copy-on-write only duplicates on a write through
//! a shared handle.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::core::array::PhpArray;
use crate::core::callable::Callable;
use crate::core::object::ObjectId;

/// A PHP array key after normalization (spec.md §3.2/§4.A).
///
/// String keys that are the canonical decimal form of a signed 64-bit
/// integer collapse to `Int`; everything else stays a byte string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArrayKey {
    Int(i64),
    Str(Rc<Vec<u8>>),
}

impl ArrayKey {
    /// Normalize a value used as an array subscript into a canonical key.
    ///
    /// `true`/`false`/`null` become `1`/`0`/`""` per spec.md §4.A.
    pub fn normalize(value: &Value) -> ArrayKey {
        match value {
            Value::Int(i) => ArrayKey::Int(*i),
            Value::String(s) => Self::from_bytes(s),
            Value::Bool(true) => ArrayKey::Int(1),
            Value::Bool(false) => ArrayKey::Int(0),
            Value::Null => ArrayKey::Str(Rc::new(Vec::new())),
            Value::Float(f) => ArrayKey::Int(*f as i64),
            other => ArrayKey::Str(Rc::new(other.to_string_lossy())),
        }
    }

    /// Normalize a raw byte string subscript, collapsing canonical integer
    /// strings (no leading zeros except a bare `"0"`, no leading `+`) to
    /// `Int` keys.
    pub fn from_bytes(s: &[u8]) -> ArrayKey {
        if is_canonical_int_key(s) {
            // Safe: is_canonical_int_key only accepts ASCII digits/'-' that
            // parse cleanly into an i64.
            let text = std::str::from_utf8(s).unwrap();
            ArrayKey::Int(text.parse::<i64>().unwrap())
        } else {
            ArrayKey::Str(Rc::new(s.to_vec()))
        }
    }
}

impl fmt::Display for ArrayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayKey::Int(i) => write!(f, "{i}"),
            ArrayKey::Str(s) => write!(f, "{}", String::from_utf8_lossy(s)),
        }
    }
}

fn is_canonical_int_key(s: &[u8]) -> bool {
    if s.is_empty() {
        return false;
    }
    let (neg, digits) = match s[0] {
        b'-' => (true, &s[1..]),
        _ => (false, s),
    };
    if digits.is_empty() || !digits.iter().all(|b| b.is_ascii_digit()) {
        return false;
    }
    // "0" is the only key allowed a leading zero; "-0" is not a valid
    // canonical integer string in PHP (stays a string key).
    if digits.len() > 1 && digits[0] == b'0' {
        return false;
    }
    if neg && digits == b"0" {
        return false;
    }
    std::str::from_utf8(s).ok().and_then(|t| t.parse::<i64>().ok()).is_some()
}

/// A shared mutable slot. Multiple `Value::Reference` handles pointing at
/// the same `Reference` observe each other's writes immediately (spec.md §3.4).
pub type Reference = Rc<RefCell<Value>>;

#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// PHP strings are byte sequences, not Unicode text.
    String(Rc<Vec<u8>>),
    Array(Rc<RefCell<PhpArray>>),
    Object(ObjectId),
    /// An opaque handle into the process-global resource registry (§4.H).
    Resource(u64),
    Callable(Rc<Callable>),
    Reference(Reference),
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(i) => write!(f, "Int({i})"),
            Value::Float(x) => write!(f, "Float({x})"),
            Value::String(s) => write!(f, "String({:?})", String::from_utf8_lossy(s)),
            Value::Array(_) => write!(f, "Array(..)"),
            Value::Object(id) => write!(f, "Object({id:?})"),
            Value::Resource(id) => write!(f, "Resource({id})"),
            Value::Callable(_) => write!(f, "Callable(..)"),
            Value::Reference(_) => write!(f, "Reference(..)"),
        }
    }
}

impl Value {
    pub fn str(bytes: impl Into<Vec<u8>>) -> Value {
        Value::String(Rc::new(bytes.into()))
    }

    pub fn array(arr: PhpArray) -> Value {
        Value::Array(Rc::new(RefCell::new(arr)))
    }

    pub fn is_null(&self) -> bool {
        matches!(self.deref_once(), Value::Null)
    }

    pub fn is_array(&self) -> bool {
        matches!(self.deref_once(), Value::Array(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self.deref_once(), Value::Object(_))
    }

    /// Transparently follow a `Reference` one level. Coercions and reads
    /// always operate on the dereferenced value; `Reference` is never
    /// itself returned from a coercion (spec.md §4.A).
    pub fn deref_once(&self) -> Value {
        match self {
            Value::Reference(slot) => slot.borrow().clone(),
            other => other.clone(),
        }
    }

    /// `ToBool`: total, never fails. Zend `zend_is_true` semantics.
    pub fn to_bool(&self) -> bool {
        match self.deref_once() {
            Value::Null => false,
            Value::Bool(b) => b,
            Value::Int(i) => i != 0,
            Value::Float(f) => f != 0.0 && !f.is_nan(),
            Value::String(s) => !(s.is_empty() || &**s == b"0"),
            Value::Array(arr) => !arr.borrow().is_empty(),
            Value::Object(_) | Value::Resource(_) | Value::Callable(_) => true,
            Value::Reference(_) => unreachable!("deref_once never returns Reference"),
        }
    }

    /// `ToInt`: total, never fails. Zend `convert_to_long` semantics.
    pub fn to_int(&self) -> i64 {
        match self.deref_once() {
            Value::Null => 0,
            Value::Bool(b) => b as i64,
            Value::Int(i) => i,
            Value::Float(f) => float_to_int(f),
            Value::String(s) => parse_leading_int(&s),
            Value::Array(arr) => {
                if arr.borrow().is_empty() {
                    0
                } else {
                    1
                }
            }
            Value::Object(_) => 1,
            Value::Resource(id) => id as i64,
            Value::Callable(_) => 1,
            Value::Reference(_) => unreachable!(),
        }
    }

    /// `ToFloat`: total, never fails. Zend `convert_to_double` semantics.
    pub fn to_float(&self) -> f64 {
        match self.deref_once() {
            Value::Null => 0.0,
            Value::Bool(b) => b as i64 as f64,
            Value::Int(i) => i as f64,
            Value::Float(f) => f,
            Value::String(s) => parse_leading_float(&s),
            Value::Array(arr) => {
                if arr.borrow().is_empty() {
                    0.0
                } else {
                    1.0
                }
            }
            Value::Object(_) => 1.0,
            Value::Resource(id) => id as f64,
            Value::Callable(_) => 1.0,
            Value::Reference(_) => unreachable!(),
        }
    }

    /// `ToString`: total, never fails.
    pub fn to_php_string(&self) -> Vec<u8> {
        self.to_string_lossy()
    }

    fn to_string_lossy(&self) -> Vec<u8> {
        match self.deref_once() {
            Value::Null => Vec::new(),
            Value::Bool(b) => if b { b"1".to_vec() } else { Vec::new() },
            Value::Int(i) => i.to_string().into_bytes(),
            Value::Float(f) => format_php_float(f).into_bytes(),
            Value::String(s) => (*s).clone(),
            Value::Array(_) => b"Array".to_vec(),
            Value::Object(_) => b"Object".to_vec(),
            Value::Resource(id) => format!("Resource id #{id}").into_bytes(),
            Value::Callable(_) => b"Closure".to_vec(),
            Value::Reference(_) => unreachable!(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self.deref_once() {
            Value::Null => "NULL",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "double",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Resource(_) => "resource",
            Value::Callable(_) => "object",
            Value::Reference(_) => unreachable!(),
        }
    }

    /// Is this string numeric in the sense PHP's `is_numeric`/loose-equality
    /// machinery uses: optional leading whitespace, optional sign, digits
    /// with an optional `.` and `e/E` exponent, optional trailing whitespace,
    /// nothing else.
    pub fn is_numeric_string(s: &[u8]) -> bool {
        numeric_string_span(s).map(|end| {
            let trailing_ws = s[end..].iter().all(|b| b.is_ascii_whitespace());
            trailing_ws
        }).unwrap_or(false)
    }
}

fn float_to_int(f: f64) -> i64 {
    if f.is_nan() || f.is_infinite() {
        0
    } else {
        f as i64
    }
}

/// Longest leading decimal digit run (spec.md §4.A): optional sign, then
/// digits, stop at the first non-digit. Empty digit run → 0.
fn parse_leading_int(s: &[u8]) -> i64 {
    let s = trim_leading_ws(s);
    let mut i = 0;
    let neg = match s.first() {
        Some(b'-') => {
            i += 1;
            true
        }
        Some(b'+') => {
            i += 1;
            false
        }
        _ => false,
    };
    let start = i;
    while i < s.len() && s[i].is_ascii_digit() {
        i += 1;
    }
    if i == start {
        return 0;
    }
    let digits = std::str::from_utf8(&s[start..i]).unwrap();
    let magnitude: i128 = digits.parse().unwrap_or(i128::MAX);
    let signed = if neg { -magnitude } else { magnitude };
    signed.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// As `parse_leading_int`, but also consumes a `.` fractional part and an
/// `e`/`E` exponent (spec.md §4.A).
fn parse_leading_float(s: &[u8]) -> f64 {
    let s = trim_leading_ws(s);
    let end = numeric_prefix_end(s);
    if end == 0 {
        return 0.0;
    }
    std::str::from_utf8(&s[..end])
        .ok()
        .and_then(|t| t.parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Length of the longest leading substring of `s` matching
/// `sign? digit* ('.' digit*)? ([eE] sign? digit+)?`, provided at least one
/// digit appears before any exponent marker.
fn numeric_prefix_end(s: &[u8]) -> usize {
    let mut i = 0;
    if matches!(s.first(), Some(b'-') | Some(b'+')) {
        i += 1;
    }
    let int_start = i;
    while i < s.len() && s[i].is_ascii_digit() {
        i += 1;
    }
    let mut saw_digit = i > int_start;
    let mut end = if saw_digit { i } else { 0 };

    if i < s.len() && s[i] == b'.' {
        let dot = i;
        i += 1;
        let frac_start = i;
        while i < s.len() && s[i].is_ascii_digit() {
            i += 1;
        }
        if i > frac_start || saw_digit {
            saw_digit = saw_digit || i > frac_start;
            end = i;
        } else {
            i = dot;
        }
    }

    if saw_digit && i < s.len() && (s[i] == b'e' || s[i] == b'E') {
        let mut j = i + 1;
        if j < s.len() && matches!(s[j], b'-' | b'+') {
            j += 1;
        }
        let exp_start = j;
        while j < s.len() && s[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            end = j;
        }
    }
    end
}

fn numeric_string_span(s: &[u8]) -> Option<usize> {
    let trimmed_start = s.iter().take_while(|b| b.is_ascii_whitespace()).count();
    let rest = &s[trimmed_start..];
    if rest.is_empty() {
        return None;
    }
    let end = numeric_prefix_end(rest);
    if end == 0 {
        None
    } else {
        Some(trimmed_start + end)
    }
}

fn trim_leading_ws(s: &[u8]) -> &[u8] {
    let skip = s
        .iter()
        .take_while(|&&b| matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c))
        .count();
    &s[skip..]
}

/// Render a float the way PHP's `precision=14` default does: shortest
/// representation, `INF`/`-INF`/`NAN` literals, no trailing `.0` elided.
fn format_php_float(f: f64) -> String {
    if f.is_nan() {
        return "NAN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "INF".to_string() } else { "-INF".to_string() };
    }
    if f == f.trunc() && f.abs() < 1e15 {
        return format!("{}", f as i64);
    }
    // PHP's exact `precision=14` rounding is a deeper rabbit hole than this
    // core needs to reproduce byte-exact; Rust's shortest round-trippable
    // formatting is close enough for a runtime core.
    format!("{f}")
}

/// Strict equality (`===`): same variant *and* same value/identity.
/// Reference-typed values (arrays, objects) compare by the identity of the
/// underlying handle for objects, and by structural equality for arrays.
pub fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a.deref_once(), b.deref_once()) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Float(x), Value::Float(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => *x.borrow() == *y.borrow(),
        (Value::Object(x), Value::Object(y)) => x == y,
        (Value::Resource(x), Value::Resource(y)) => x == y,
        (Value::Callable(x), Value::Callable(y)) => Rc::ptr_eq(&x, &y),
        _ => false,
    }
}

/// Loose equality (`==`): numeric/string coercion per spec.md §3.1/§4.A.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    use Value::*;
    match (a.deref_once(), b.deref_once()) {
        (Null, Null) => true,
        (Null, other) | (other, Null) => !other.to_bool(),
        (Bool(x), other) => x == other.to_bool(),
        (other, Bool(y)) => other.to_bool() == y,
        (Int(x), Int(y)) => x == y,
        (Float(x), Float(y)) => x == y,
        (Int(x), Float(y)) | (Float(y), Int(x)) => (x as f64) == y,
        (String(x), String(y)) => {
            if Value::is_numeric_string(&x) && Value::is_numeric_string(&y) {
                parse_leading_float(&x) == parse_leading_float(&y)
            } else {
                x == y
            }
        }
        (Int(n), String(s)) | (String(s), Int(n)) => {
            Value::is_numeric_string(&s) && parse_leading_float(&s) == n as f64
        }
        (Float(n), String(s)) | (String(s), Float(n)) => {
            Value::is_numeric_string(&s) && parse_leading_float(&s) == n
        }
        (Array(x), Array(y)) => *x.borrow() == *y.borrow(),
        (Object(x), Object(y)) => x == y,
        (Resource(x), Resource(y)) => x == y,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coercion_is_total() {
        let values = vec![
            Value::Null,
            Value::Bool(true),
            Value::Int(-5),
            Value::Float(f64::NAN),
            Value::str("abc123"),
            Value::array(PhpArray::new()),
        ];
        for v in values {
            let _ = v.to_bool();
            let _ = v.to_int();
            let _ = v.to_float();
            let _ = v.to_php_string();
        }
    }

    #[test]
    fn to_int_reads_longest_leading_digit_run() {
        assert_eq!(Value::str("123abc").to_int(), 123);
        assert_eq!(Value::str("-42x").to_int(), -42);
        assert_eq!(Value::str("abc").to_int(), 0);
        assert_eq!(Value::str("").to_int(), 0);
        assert_eq!(Value::str("  12").to_int(), 12);
    }

    #[test]
    fn to_float_accepts_dot_and_exponent() {
        assert!((Value::str("1.5e2zzz").to_float() - 150.0).abs() < 1e-9);
        assert!((Value::str(".5").to_float() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn falsy_strings_match_php() {
        assert!(!Value::str("").to_bool());
        assert!(!Value::str("0").to_bool());
        assert!(Value::str("0.0").to_bool());
        assert!(Value::str("00").to_bool());
    }

    #[test]
    fn loose_eq_numeric_string_vs_int() {
        assert!(loose_eq(&Value::str("1"), &Value::Int(1)));
        assert!(!loose_eq(&Value::str("1abc"), &Value::Int(1)));
    }

    #[test]
    fn loose_eq_two_numeric_strings_compares_numerically() {
        assert!(loose_eq(&Value::str("1e2"), &Value::str("100")));
        assert!(loose_eq(&Value::str("  10 "), &Value::str("10")));
    }

    #[test]
    fn loose_eq_non_numeric_strings_compares_lexically() {
        assert!(!loose_eq(&Value::str("abc"), &Value::str("abd")));
        assert!(loose_eq(&Value::str("abc"), &Value::str("abc")));
    }

    #[test]
    fn array_key_normalizes_canonical_integers() {
        assert_eq!(ArrayKey::from_bytes(b"42"), ArrayKey::Int(42));
        assert_eq!(ArrayKey::from_bytes(b"-42"), ArrayKey::Int(-42));
        assert_eq!(ArrayKey::from_bytes(b"042"), ArrayKey::Str(Rc::new(b"042".to_vec())));
        assert_eq!(ArrayKey::from_bytes(b"+42"), ArrayKey::Str(Rc::new(b"+42".to_vec())));
        assert_eq!(ArrayKey::from_bytes(b"0"), ArrayKey::Int(0));
        assert_eq!(ArrayKey::from_bytes(b"-0"), ArrayKey::Str(Rc::new(b"-0".to_vec())));
    }

    #[test]
    fn strict_eq_requires_same_type() {
        assert!(!strict_eq(&Value::Int(1), &Value::str("1")));
        assert!(strict_eq(&Value::Int(1), &Value::Int(1)));
    }

    #[test]
    fn reference_deref_is_transparent_on_read() {
        let slot: Reference = Rc::new(RefCell::new(Value::Int(1)));
        let v = Value::Reference(slot.clone());
        assert_eq!(v.to_int(), 1);
        *slot.borrow_mut() = Value::Int(2);
        assert_eq!(v.to_int(), 2);
    }
}
