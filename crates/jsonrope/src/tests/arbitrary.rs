//! Generator for structurally arbitrary JSON documents.
//!
//! Values are generated as a plain owned tree and converted to [`Value`]
//! graphs against a concrete runtime inside each property, since `Arbitrary`
//! has no way to thread a `&Runtime` through.

use std::{cell::RefCell, rc::Rc};

use quickcheck::{Arbitrary, Gen};

use crate::{Object, PropKey, Runtime, Value};

#[derive(Clone, Debug)]
pub(crate) enum Tree {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Array(Vec<Tree>),
    Object(Vec<(String, Tree)>),
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct FiniteNumber(f64);

impl Arbitrary for FiniteNumber {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut value = f64::arbitrary(g);
        while !value.is_finite() {
            value = f64::arbitrary(g);
        }
        Self(value)
    }
}

impl Arbitrary for Tree {
    fn arbitrary(g: &mut Gen) -> Self {
        fn gen_tree(g: &mut Gen, depth: usize) -> Tree {
            let scalar_only = depth == 0;
            match usize::arbitrary(g) % (if scalar_only { 4 } else { 6 }) {
                0 => Tree::Null,
                1 => Tree::Boolean(bool::arbitrary(g)),
                2 => Tree::Number(FiniteNumber::arbitrary(g).0),
                3 => Tree::String(String::arbitrary(g)),
                4 => {
                    let len = usize::arbitrary(g) % 4;
                    Tree::Array((0..len).map(|_| gen_tree(g, depth - 1)).collect())
                }
                _ => {
                    let len = usize::arbitrary(g) % 4;
                    Tree::Object(
                        (0..len)
                            .map(|_| (String::arbitrary(g), gen_tree(g, depth - 1)))
                            .collect(),
                    )
                }
            }
        }
        let depth = usize::arbitrary(g) % 3;
        gen_tree(g, depth)
    }
}

impl Tree {
    pub(crate) fn to_value(&self, rt: &Runtime) -> Value {
        match self {
            Tree::Null => Value::Null,
            Tree::Boolean(b) => Value::Boolean(*b),
            Tree::Number(n) => Value::Number(*n),
            Tree::String(text) => Value::String(rt.str_from_str(text)),
            Tree::Array(items) => Value::Array(Rc::new(RefCell::new(
                items.iter().map(|t| t.to_value(rt)).collect(),
            ))),
            Tree::Object(props) => {
                let mut obj = Object::new();
                for (name, tree) in props {
                    obj.set(
                        PropKey::from_name(&rt.str_from_str(name)),
                        tree.to_value(rt),
                    );
                }
                Value::Object(obj.into_ref())
            }
        }
    }
}
