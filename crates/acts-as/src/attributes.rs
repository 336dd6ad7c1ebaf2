//! String-named attribute dispatch
//!
//! Method names follow the attribute method family:
//! `name`, `name=`, `name?`, `name_change`, `name_changed?`, `name_was`,
//! `name_will_change!`. A model answers from its own record first, then from
//! its fallback (the supermodel, for facades). Anything else is a
//! `MethodNotFound`.

use crate::errors::{AppError, Result};
use serde_json::{Map, Value as Json};

/// One member of an attribute's method family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeMethod {
    Read,
    Write,
    Present,
    Change,
    Changed,
    Was,
    WillChange,
}

impl AttributeMethod {
    /// Suffixed forms, longest suffixes first
    const SUFFIXED: [(&'static str, AttributeMethod); 6] = [
        ("_will_change!", AttributeMethod::WillChange),
        ("_changed?", AttributeMethod::Changed),
        ("_change", AttributeMethod::Change),
        ("_was", AttributeMethod::Was),
        ("=", AttributeMethod::Write),
        ("?", AttributeMethod::Present),
    ];

    pub const ALL: [AttributeMethod; 7] = [
        AttributeMethod::Read,
        AttributeMethod::Write,
        AttributeMethod::Present,
        AttributeMethod::Change,
        AttributeMethod::Changed,
        AttributeMethod::Was,
        AttributeMethod::WillChange,
    ];

    /// Method name of this family member for `attribute`
    pub fn method_name(self, attribute: &str) -> String {
        match self {
            AttributeMethod::Read => attribute.to_owned(),
            AttributeMethod::Write => format!("{}=", attribute),
            AttributeMethod::Present => format!("{}?", attribute),
            AttributeMethod::Change => format!("{}_change", attribute),
            AttributeMethod::Changed => format!("{}_changed?", attribute),
            AttributeMethod::Was => format!("{}_was", attribute),
            AttributeMethod::WillChange => format!("{}_will_change!", attribute),
        }
    }

    /// Split `method` into an attribute accepted by `known` and a family member
    pub fn resolve<'m>(
        method: &'m str,
        known: impl Fn(&str) -> bool,
    ) -> Option<(&'m str, AttributeMethod)> {
        for (suffix, kind) in Self::SUFFIXED {
            if let Some(attribute) = method.strip_suffix(suffix) {
                if !attribute.is_empty() && known(attribute) {
                    return Some((attribute, kind));
                }
            }
        }
        known(method).then_some((method, AttributeMethod::Read))
    }
}

/// Object-safe, string-named view of a change-tracked record
pub trait Attributes {
    fn attribute_names(&self) -> Vec<String>;

    fn has_attribute(&self, name: &str) -> bool;

    /// `None` when the attribute does not exist
    fn read_json(&self, name: &str) -> Option<Json>;

    fn write_json(&mut self, name: &str, value: Json) -> Result<()>;

    fn attribute_present(&self, name: &str) -> bool;

    fn attribute_changed(&self, name: &str) -> bool;

    fn attribute_was(&self, name: &str) -> Json;

    fn attribute_will_change(&mut self, name: &str);
}

/// Runtime method dispatch over a model's attributes
pub trait Dispatch: Send {
    fn dispatch_name(&self) -> &'static str;

    fn attributes(&self) -> &dyn Attributes;

    fn attributes_mut(&mut self) -> &mut dyn Attributes;

    /// Attributes that reject `name=`
    fn readonly_attributes(&self) -> &'static [&'static str] {
        &["id"]
    }

    /// Extra, non-attribute methods this model answers
    fn methods(&self) -> &'static [&'static str] {
        &[]
    }

    /// Invoke one of `methods()`
    fn call_method(&mut self, _method: &str, _argument: Option<Json>) -> Option<Result<Json>> {
        None
    }

    /// Where unknown methods are forwarded to
    fn fallback(&self) -> Option<&dyn Dispatch> {
        None
    }

    fn fallback_mut(&mut self) -> Option<&mut dyn Dispatch> {
        None
    }

    fn respond_to(&self, method: &str) -> bool {
        self.methods().contains(&method)
            || AttributeMethod::resolve(method, |a| self.attributes().has_attribute(a)).is_some()
            || self.fallback().is_some_and(|f| f.respond_to(method))
    }

    /// Every method name this model answers, fallback included
    fn method_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.methods().iter().map(|m| m.to_string()).collect();
        for attribute in self.attributes().attribute_names() {
            names.extend(AttributeMethod::ALL.iter().map(|k| k.method_name(&attribute)));
        }
        if let Some(fallback) = self.fallback() {
            for name in fallback.method_names() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    fn send(&mut self, method: &str, argument: Option<Json>) -> Result<Json> {
        if self.methods().contains(&method) {
            if let Some(outcome) = self.call_method(method, argument.clone()) {
                return outcome;
            }
        }

        let resolved = AttributeMethod::resolve(method, |a| self.attributes().has_attribute(a))
            .map(|(attribute, kind)| (attribute.to_owned(), kind));
        if let Some((attribute, kind)) = resolved {
            return dispatch_attribute(self, &attribute, kind, argument);
        }

        let model = self.dispatch_name();
        match self.fallback_mut() {
            Some(fallback) if fallback.respond_to(method) => fallback.send(method, argument),
            _ => Err(AppError::MethodNotFound {
                model,
                method: method.to_owned(),
            }),
        }
    }

    fn read_attribute(&self, name: &str) -> Result<Json> {
        if let Some(value) = self.attributes().read_json(name) {
            return Ok(value);
        }
        match self.fallback() {
            Some(fallback) => fallback.read_attribute(name),
            None => Err(AppError::UnknownAttribute {
                model: self.dispatch_name(),
                attribute: name.to_owned(),
            }),
        }
    }

    /// Mass assignment through the `name=` family
    fn assign_attributes(&mut self, attributes: Map<String, Json>) -> Result<()> {
        for (name, value) in attributes {
            let setter = AttributeMethod::Write.method_name(&name);
            if !self.respond_to(&setter) {
                return Err(AppError::UnknownAttribute {
                    model: self.dispatch_name(),
                    attribute: name,
                });
            }
            self.send(&setter, Some(value))?;
        }
        Ok(())
    }
}

fn dispatch_attribute<D: Dispatch + ?Sized>(
    model: &mut D,
    attribute: &str,
    kind: AttributeMethod,
    argument: Option<Json>,
) -> Result<Json> {
    if kind == AttributeMethod::Write {
        if model.readonly_attributes().contains(&attribute) {
            return Err(AppError::ReadonlyAttribute {
                model: model.dispatch_name(),
                attribute: attribute.to_owned(),
            });
        }
    } else if argument.is_some() {
        return Err(AppError::InvalidArgument {
            method: kind.method_name(attribute),
            message: "takes no argument".to_owned(),
        });
    }

    let record = model.attributes_mut();
    match kind {
        AttributeMethod::Read => Ok(record.read_json(attribute).unwrap_or(Json::Null)),
        AttributeMethod::Write => {
            let value = argument.ok_or_else(|| AppError::InvalidArgument {
                method: kind.method_name(attribute),
                message: "expects a value".to_owned(),
            })?;
            record.write_json(attribute, value.clone())?;
            Ok(value)
        }
        AttributeMethod::Present => Ok(Json::Bool(record.attribute_present(attribute))),
        AttributeMethod::Changed => Ok(Json::Bool(record.attribute_changed(attribute))),
        AttributeMethod::Was => Ok(record.attribute_was(attribute)),
        AttributeMethod::Change => {
            if record.attribute_changed(attribute) {
                let now = record.read_json(attribute).unwrap_or(Json::Null);
                Ok(Json::Array(vec![record.attribute_was(attribute), now]))
            } else {
                Ok(Json::Null)
            }
        }
        AttributeMethod::WillChange => {
            record.attribute_will_change(attribute);
            Ok(Json::Null)
        }
    }
}
