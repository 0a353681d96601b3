//! Slot projection from an acquired record onto a target.

use acq_script::{Record, Value};

use crate::completion::Outcome;
use crate::error::{ImportError, ImportRole};

/// Which slots to copy, and where.
///
/// No slots means every slot. No target means a fresh record.
#[derive(Clone, Debug, Default)]
pub struct ImportSpec {
    slots: Vec<String>,
    target: Option<Value>,
}

impl ImportSpec {
    /// Every slot, onto a fresh record.
    pub fn all() -> Self {
        Self::default()
    }

    /// The named slots, onto a fresh record.
    pub fn slots<I, S>(slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ImportSpec {
            slots: slots.into_iter().map(Into::into).collect(),
            target: None,
        }
    }

    /// Copy onto `target` instead of a fresh record.
    #[must_use]
    pub fn onto(mut self, target: impl Into<Value>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Interpret unit-call arguments: strings are slot names, and a final
    /// non-string argument is the target.
    pub fn from_args(args: &[Value]) -> Result<Self, String> {
        let (target, names) = match args.split_last() {
            Some((last, rest)) if last.as_str().is_none() => (Some(last.clone()), rest),
            _ => (None, args),
        };
        let slots = names
            .iter()
            .map(|arg| {
                arg.as_str().map(str::to_owned).ok_or_else(|| {
                    format!(
                        "slot names must be strings, found `{}`",
                        arg.type_name()
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ImportSpec { slots, target })
    }

    pub fn slot_names(&self) -> &[String] {
        &self.slots
    }

    pub fn target(&self) -> Option<&Value> {
        self.target.as_ref()
    }
}

/// Copy the slots `spec` names from `value` onto its target and return the
/// target.
///
/// Nothing is copied unless every named slot exists.
pub(crate) fn project(value: &Value, spec: &ImportSpec) -> Outcome {
    let source = value.as_record().ok_or(ImportError::NotARecord {
        role: ImportRole::Source,
        found: value.type_name(),
    })?;
    let target = match &spec.target {
        Some(target) => target
            .as_record()
            .cloned()
            .ok_or(ImportError::NotARecord {
                role: ImportRole::Target,
                found: target.type_name(),
            })?,
        None => Record::new(),
    };

    if spec.slots.is_empty() {
        for (slot, slot_value) in source.slots() {
            target.set(slot, slot_value);
        }
    } else {
        let mut picked = Vec::with_capacity(spec.slots.len());
        for slot in &spec.slots {
            let slot_value = source
                .get(slot)
                .ok_or_else(|| ImportError::MissingSlot { slot: slot.clone() })?;
            picked.push((slot.as_str(), slot_value));
        }
        for (slot, slot_value) in picked {
            target.set(slot, slot_value);
        }
    }

    Ok(Value::Record(target))
}
