//! Template and choice metadata.
//!
//! A [`Template`] is the descriptor of a contract payload type plus the
//! identity the ledger knows it by. A [`Choice`] is the descriptor of a
//! choice's argument plus its name and a reference to the owning template.
//! The reference only carries the template's [`Identifier`]; a choice never
//! goes back through its template to decode anything.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use ledger_decode::{object, string, DecodeError, Decoder, ValidationError};
use serde_json::Value;

use crate::descriptor::{Descriptor, Serializable};
use crate::primitives::Unit;

/// Name of the choice every template has.
pub const ARCHIVE: &str = "Archive";

/// Identifies a template within a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier {
    pub package_id: String,
    pub module_name: String,
    pub entity_name: String,
}

impl Identifier {
    pub fn new(
        package_id: impl Into<String>,
        module_name: impl Into<String>,
        entity_name: impl Into<String>,
    ) -> Self {
        Identifier {
            package_id: package_id.into(),
            module_name: module_name.into(),
            entity_name: entity_name.into(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.package_id, self.module_name, self.entity_name
        )
    }
}

/// Parses `packageId:moduleName:entityName`.
impl FromStr for Identifier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [package_id, module_name, entity_name]
                if parts.iter().all(|p| !p.is_empty()) =>
            {
                Ok(Identifier::new(*package_id, *module_name, *entity_name))
            }
            _ => Err(format!(
                "invalid template id '{}' (expected packageId:moduleName:entityName)",
                s
            )),
        }
    }
}

impl Serializable for Identifier {
    fn decoder() -> Decoder<Self> {
        let text = string();
        object(move |f| {
            Ok(Identifier {
                package_id: f.required("packageId", &text)?,
                module_name: f.required("moduleName", &text)?,
                entity_name: f.required("entityName", &text)?,
            })
        })
    }
}

// ── Template ────────────────────────────────────────────────────────

/// A contract payload type together with its template identity.
///
/// Templates are usually built once and kept in a `static`:
///
/// ```
/// use std::sync::LazyLock;
/// use ledger_types::{Descriptor, Identifier, Party, Template};
///
/// static OWNER: LazyLock<Template<Party>> = LazyLock::new(|| {
///     Template::new(Identifier::new("pkg", "Main", "Owner"), Descriptor::of())
/// });
///
/// assert_eq!(OWNER.archive().choice_name(), "Archive");
/// ```
pub struct Template<T> {
    template_id: Identifier,
    descriptor: Descriptor<T>,
    archive: Choice<T, Unit>,
}

impl<T: 'static> Template<T> {
    pub fn new(template_id: Identifier, descriptor: Descriptor<T>) -> Self {
        let archive = Choice {
            template: TemplateRef::new(template_id.clone()),
            choice_name: ARCHIVE.to_string(),
            descriptor: Descriptor::of(),
        };
        Template {
            template_id,
            descriptor,
            archive,
        }
    }

    pub fn template_id(&self) -> &Identifier {
        &self.template_id
    }

    pub fn descriptor(&self) -> &Descriptor<T> {
        &self.descriptor
    }

    /// The payload decoder.
    pub fn decoder(&self) -> Decoder<T> {
        self.descriptor.decoder()
    }

    /// The `Archive` choice: argument `{}`, result `{}`.
    pub fn archive(&self) -> &Choice<T, Unit> {
        &self.archive
    }

    /// Declare another choice on this template.
    pub fn choice<C: 'static>(
        &self,
        choice_name: impl Into<String>,
        descriptor: Descriptor<C>,
    ) -> Choice<T, C> {
        Choice {
            template: self.reference(),
            choice_name: choice_name.into(),
            descriptor,
        }
    }

    pub fn reference(&self) -> TemplateRef<T> {
        TemplateRef::new(self.template_id.clone())
    }

    pub fn decode(&self, value: &Value) -> Result<T, ValidationError> {
        self.decoder().decode(value).inspect_err(|e| {
            tracing::debug!(template = %self.template_id, error = %e, "payload decode failed");
        })
    }

    pub fn decode_str(&self, text: &str) -> Result<T, DecodeError> {
        self.decoder().decode_str(text).inspect_err(|e| {
            tracing::debug!(template = %self.template_id, error = %e, "payload decode failed");
        })
    }
}

impl<T> fmt::Debug for Template<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("template_id", &self.template_id)
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for Template<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.template_id, f)
    }
}

/// Name-only reference from a choice to its template.
pub struct TemplateRef<T> {
    template_id: Identifier,
    _template: PhantomData<fn() -> T>,
}

impl<T> TemplateRef<T> {
    fn new(template_id: Identifier) -> Self {
        TemplateRef {
            template_id,
            _template: PhantomData,
        }
    }

    pub fn template_id(&self) -> &Identifier {
        &self.template_id
    }
}

impl<T> Clone for TemplateRef<T> {
    fn clone(&self) -> Self {
        TemplateRef::new(self.template_id.clone())
    }
}

impl<T> PartialEq for TemplateRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.template_id == other.template_id
    }
}

impl<T> Eq for TemplateRef<T> {}

impl<T> fmt::Debug for TemplateRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TemplateRef").field(&self.template_id).finish()
    }
}

// ── Choice ──────────────────────────────────────────────────────────

/// A named choice on template `T` whose argument has type `C`.
pub struct Choice<T, C> {
    template: TemplateRef<T>,
    choice_name: String,
    descriptor: Descriptor<C>,
}

impl<T, C: 'static> Choice<T, C> {
    pub fn template(&self) -> &TemplateRef<T> {
        &self.template
    }

    pub fn template_id(&self) -> &Identifier {
        self.template.template_id()
    }

    pub fn choice_name(&self) -> &str {
        &self.choice_name
    }

    pub fn descriptor(&self) -> &Descriptor<C> {
        &self.descriptor
    }

    pub fn decoder(&self) -> Decoder<C> {
        self.descriptor.decoder()
    }

    pub fn decode(&self, value: &Value) -> Result<C, ValidationError> {
        self.decoder().decode(value).inspect_err(|e| {
            tracing::debug!(
                template = %self.template.template_id,
                choice = %self.choice_name,
                error = %e,
                "choice decode failed"
            );
        })
    }
}

impl<T, C> Clone for Choice<T, C> {
    fn clone(&self) -> Self {
        Choice {
            template: self.template.clone(),
            choice_name: self.choice_name.clone(),
            descriptor: self.descriptor.clone(),
        }
    }
}

impl<T, C> fmt::Debug for Choice<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Choice")
            .field("template", &self.template)
            .field("choice_name", &self.choice_name)
            .field("descriptor", &self.descriptor)
            .finish()
    }
}
