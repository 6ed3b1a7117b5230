//! Argument binder. Consumes one token (or one space-delimited token group
//! for fixed-length arrays) per argument slot and coerces it to the declared
//! type.

use {
    crate::{
        error::ArgumentBindingError,
        schema::{ArgSpec, ArgType, ArgValue},
        tokens::TokenCursor,
    },
    std::io,
};

/// Arguments resolved for one scenario, in slot order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoundArgs {
    pub args: Vec<(String, ArgValue)>,
}

impl BoundArgs {
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.args
            .iter()
            .find(|(arg, _)| arg == name)
            .map(|(_, value)| value)
    }

    /// The Borsh encoding of every argument, in slot order.
    pub fn encode(&self) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        for (_, value) in &self.args {
            value.encode(&mut out)?;
        }
        Ok(out)
    }
}

/// Bind every argument slot, in order.
pub fn bind_args(
    cursor: &mut TokenCursor,
    args: &[ArgSpec],
) -> Result<BoundArgs, ArgumentBindingError> {
    let mut bound = BoundArgs::default();

    for spec in args {
        let token = cursor
            .next_token()
            .ok_or_else(|| ArgumentBindingError::MissingToken {
                name: spec.name.clone(),
            })?;

        let value = match spec.ty.as_array() {
            Some((element, len)) => bind_array(spec, element, len, token)?,
            None => bind_scalar(spec, token)?,
        };
        bound.args.push((spec.name.clone(), value));
    }

    Ok(bound)
}

fn bind_scalar(spec: &ArgSpec, token: &str) -> Result<ArgValue, ArgumentBindingError> {
    if !spec.ty.is_scalar() {
        return Err(unsupported(spec, &spec.ty));
    }
    spec.ty
        .coerce(token)
        .ok_or_else(|| ArgumentBindingError::TypeConversion {
            name: spec.name.clone(),
            index: None,
            raw: token.to_string(),
        })
}

fn bind_array(
    spec: &ArgSpec,
    element: &ArgType,
    len: usize,
    token: &str,
) -> Result<ArgValue, ArgumentBindingError> {
    let raw_values: Vec<&str> = token.split_whitespace().collect();

    // Length is settled before any element is looked at.
    if raw_values.len() != len {
        return Err(ArgumentBindingError::ArrayLength {
            name: spec.name.clone(),
            expected: len,
            actual: raw_values.len(),
        });
    }
    if !element.is_scalar() {
        return Err(unsupported(spec, &spec.ty));
    }

    raw_values
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            element
                .coerce(raw)
                .ok_or_else(|| ArgumentBindingError::TypeConversion {
                    name: spec.name.clone(),
                    index: Some(index),
                    raw: raw.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(ArgValue::Array)
}

fn unsupported(spec: &ArgSpec, ty: &ArgType) -> ArgumentBindingError {
    ArgumentBindingError::UnsupportedType {
        name: spec.name.clone(),
        declared: ty.to_string(),
    }
}
