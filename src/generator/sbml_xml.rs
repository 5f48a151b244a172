//! Generate SBML text from a [`Document`].
//!
//! Element order inside the model is fixed by the SBML schema, not by the
//! order in which the caller created things. Within each element, attributes
//! are written in schema order, `metaid` and `sboTerm` first. `notes` and
//! `annotation` always precede an element's own children.

use crate::generator::attributes::Attributes;
use crate::generator::xml_writer::XmlWriter;
use crate::math::AstNode;
use crate::math::mathml::write_math;
use crate::model::*;

pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Level and version the output targets. Some attributes are written only
/// at particular versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteContext {
    pub level: u32,
    pub version: u32,
}

impl Default for WriteContext {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            version: DEFAULT_VERSION,
        }
    }
}

impl WriteContext {
    pub fn for_document(doc: &Document) -> Self {
        Self {
            level: doc.level(),
            version: doc.version(),
        }
    }

    fn is_l3v1(&self) -> bool {
        self.level == 3 && self.version == 1
    }
}

/// Anything that can be written as one SBML element.
pub trait SbmlElement {
    fn write_element(&self, w: &mut XmlWriter, ctx: &WriteContext);

    /// The element on its own, at Level 3 Version 1, without a trailing
    /// newline.
    fn to_sbml(&self) -> String {
        self.to_sbml_with(&WriteContext::default())
    }

    /// The element on its own at the given level and version; use
    /// [`WriteContext::for_document`] for an element of a particular document.
    fn to_sbml_with(&self, ctx: &WriteContext) -> String {
        let mut w = XmlWriter::new();
        self.write_element(&mut w, ctx);
        let mut out = w.into_string();
        if out.ends_with('\n') {
            out.pop();
        }
        out
    }
}

/// Generate the full document text, starting with the XML declaration.
///
/// `comment` is written as an XML comment between the declaration and the
/// root element.
pub fn generate_document_xml(doc: &Document, comment: Option<&str>) -> String {
    let ctx = WriteContext::for_document(doc);
    let mut w = XmlWriter::new();
    w.push_raw(XML_DECLARATION);
    if let Some(text) = comment {
        w.comment(text);
    }

    let mut attrs = Attributes::new();
    attrs.push("xmlns", doc.namespace_uri());
    for (prefix, uri) in &doc.namespaces {
        attrs.push(format!("xmlns:{}", prefix), uri.as_str());
    }
    attrs
        .push("level", doc.level().to_string())
        .push("version", doc.version().to_string())
        .string("metaid", doc.base.metaid.as_deref())
        .sbo_term(doc.base.sbo_term);

    w.element("sbml", &attrs, |w| {
        write_sbase_children(w, &doc.base);
        if let Some(model) = &doc.model {
            model.write_element(w, &ctx);
        }
    });
    w.into_string()
}

impl Document {
    /// The whole document as SBML text, without a program comment.
    pub fn to_sbml(&self) -> String {
        generate_document_xml(self, None)
    }
}

fn base_attributes(base: &SBase) -> Attributes {
    let mut attrs = Attributes::new();
    attrs
        .string("metaid", base.metaid.as_deref())
        .sbo_term(base.sbo_term);
    attrs
}

fn write_sbase_children(w: &mut XmlWriter, base: &SBase) {
    if let Some(notes) = &base.notes {
        w.fragment(notes);
    }
    if let Some(annotation) = &base.annotation {
        w.fragment(annotation);
    }
}

fn write_optional_math(w: &mut XmlWriter, math: Option<&AstNode>) {
    if let Some(node) = math {
        write_math(w, node);
    }
}

/// `<tag>` wrapper around the items, skipped entirely for an empty list.
fn write_list<T: SbmlElement>(w: &mut XmlWriter, tag: &str, items: &[T], ctx: &WriteContext) {
    if items.is_empty() {
        return;
    }
    w.element(tag, &Attributes::new(), |w| {
        for item in items {
            item.write_element(w, ctx);
        }
    });
}

// ────────────────────────────────────────────────────────────────────────────
// Model
// ────────────────────────────────────────────────────────────────────────────

impl SbmlElement for Model {
    fn write_element(&self, w: &mut XmlWriter, ctx: &WriteContext) {
        let mut attrs = base_attributes(&self.base);
        attrs
            .string("id", self.id.as_deref())
            .string("name", self.name.as_deref())
            .string("substanceUnits", self.substance_units.as_deref())
            .string("timeUnits", self.time_units.as_deref())
            .string("volumeUnits", self.volume_units.as_deref())
            .string("areaUnits", self.area_units.as_deref())
            .string("lengthUnits", self.length_units.as_deref())
            .string("extentUnits", self.extent_units.as_deref())
            .string("conversionFactor", self.conversion_factor.as_deref());

        w.element("model", &attrs, |w| {
            write_sbase_children(w, &self.base);
            write_list(w, "listOfFunctionDefinitions", &self.function_definitions, ctx);
            write_list(w, "listOfUnitDefinitions", &self.unit_definitions, ctx);
            write_list(w, "listOfCompartments", &self.compartments, ctx);
            write_list(w, "listOfSpecies", &self.species, ctx);
            write_list(w, "listOfParameters", &self.parameters, ctx);
            write_list(w, "listOfInitialAssignments", &self.initial_assignments, ctx);
            write_list(w, "listOfRules", &self.rules, ctx);
            write_list(w, "listOfConstraints", &self.constraints, ctx);
            write_list(w, "listOfReactions", &self.reactions, ctx);
            write_list(w, "listOfEvents", &self.events, ctx);
        });
    }
}

impl SbmlElement for FunctionDefinition {
    fn write_element(&self, w: &mut XmlWriter, _ctx: &WriteContext) {
        let mut attrs = base_attributes(&self.base);
        attrs
            .string("id", self.id.as_deref())
            .string("name", self.name.as_deref());
        w.element("functionDefinition", &attrs, |w| {
            write_sbase_children(w, &self.base);
            write_optional_math(w, self.math.as_ref());
        });
    }
}

impl SbmlElement for UnitDefinition {
    fn write_element(&self, w: &mut XmlWriter, ctx: &WriteContext) {
        let mut attrs = base_attributes(&self.base);
        attrs
            .string("id", self.id.as_deref())
            .string("name", self.name.as_deref());
        w.element("unitDefinition", &attrs, |w| {
            write_sbase_children(w, &self.base);
            write_list(w, "listOfUnits", &self.units, ctx);
        });
    }
}

impl SbmlElement for Unit {
    fn write_element(&self, w: &mut XmlWriter, _ctx: &WriteContext) {
        let mut attrs = base_attributes(&self.base);
        attrs
            .unit_kind("kind", self.kind)
            .double_or_nan("exponent", self.exponent)
            .scale("scale", self.scale)
            .double_or_nan("multiplier", self.multiplier);
        w.element("unit", &attrs, |w| write_sbase_children(w, &self.base));
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Compartments, species, parameters
// ────────────────────────────────────────────────────────────────────────────

impl SbmlElement for Compartment {
    fn write_element(&self, w: &mut XmlWriter, _ctx: &WriteContext) {
        let mut attrs = base_attributes(&self.base);
        attrs
            .string("id", self.id.as_deref())
            .string("name", self.name.as_deref())
            .double("spatialDimensions", self.spatial_dimensions)
            .double("size", self.size)
            .string("units", self.units.as_deref())
            .required_bool("constant", self.constant, true);
        w.element("compartment", &attrs, |w| write_sbase_children(w, &self.base));
    }
}

impl SbmlElement for Species {
    fn write_element(&self, w: &mut XmlWriter, _ctx: &WriteContext) {
        let mut attrs = base_attributes(&self.base);
        attrs
            .string("id", self.id.as_deref())
            .string("name", self.name.as_deref())
            .string("compartment", self.compartment.as_deref())
            .double("initialAmount", self.initial_amount)
            .double("initialConcentration", self.initial_concentration)
            .string("substanceUnits", self.substance_units.as_deref())
            .required_bool("hasOnlySubstanceUnits", self.has_only_substance_units, false)
            .required_bool("boundaryCondition", self.boundary_condition, false)
            .required_bool("constant", self.constant, false)
            .string("conversionFactor", self.conversion_factor.as_deref());
        w.element("species", &attrs, |w| write_sbase_children(w, &self.base));
    }
}

impl SbmlElement for Parameter {
    fn write_element(&self, w: &mut XmlWriter, _ctx: &WriteContext) {
        let mut attrs = base_attributes(&self.base);
        attrs
            .string("id", self.id.as_deref())
            .string("name", self.name.as_deref())
            .double("value", self.value)
            .string("units", self.units.as_deref())
            .required_bool("constant", self.constant, true);
        w.element("parameter", &attrs, |w| write_sbase_children(w, &self.base));
    }
}

impl SbmlElement for LocalParameter {
    fn write_element(&self, w: &mut XmlWriter, _ctx: &WriteContext) {
        let mut attrs = base_attributes(&self.base);
        attrs
            .string("id", self.id.as_deref())
            .string("name", self.name.as_deref())
            .double("value", self.value)
            .string("units", self.units.as_deref());
        w.element("localParameter", &attrs, |w| write_sbase_children(w, &self.base));
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Assignments, rules, constraints
// ────────────────────────────────────────────────────────────────────────────

impl SbmlElement for InitialAssignment {
    fn write_element(&self, w: &mut XmlWriter, _ctx: &WriteContext) {
        let mut attrs = base_attributes(&self.base);
        attrs.string("symbol", self.symbol.as_deref());
        w.element("initialAssignment", &attrs, |w| {
            write_sbase_children(w, &self.base);
            write_optional_math(w, self.math.as_ref());
        });
    }
}

impl SbmlElement for Rule {
    fn write_element(&self, w: &mut XmlWriter, _ctx: &WriteContext) {
        let mut attrs = base_attributes(&self.base);
        if self.kind != RuleKind::Algebraic {
            attrs.string("variable", self.variable.as_deref());
        }
        w.element(self.kind.tag(), &attrs, |w| {
            write_sbase_children(w, &self.base);
            write_optional_math(w, self.math.as_ref());
        });
    }
}

impl SbmlElement for Constraint {
    fn write_element(&self, w: &mut XmlWriter, _ctx: &WriteContext) {
        let attrs = base_attributes(&self.base);
        w.element("constraint", &attrs, |w| {
            write_sbase_children(w, &self.base);
            write_optional_math(w, self.math.as_ref());
            if let Some(message) = &self.message {
                w.fragment(message);
            }
        });
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Reactions
// ────────────────────────────────────────────────────────────────────────────

impl SbmlElement for Reaction {
    fn write_element(&self, w: &mut XmlWriter, ctx: &WriteContext) {
        let mut attrs = base_attributes(&self.base);
        attrs
            .string("id", self.id.as_deref())
            .string("name", self.name.as_deref())
            .required_bool("reversible", self.reversible, true);
        if ctx.is_l3v1() {
            attrs.required_bool("fast", self.fast, false);
        }
        attrs.string("compartment", self.compartment.as_deref());

        w.element("reaction", &attrs, |w| {
            write_sbase_children(w, &self.base);
            write_list(w, "listOfReactants", &self.reactants, ctx);
            write_list(w, "listOfProducts", &self.products, ctx);
            write_list(w, "listOfModifiers", &self.modifiers, ctx);
            if let Some(law) = &self.kinetic_law {
                law.write_element(w, ctx);
            }
        });
    }
}

impl SbmlElement for SpeciesReference {
    fn write_element(&self, w: &mut XmlWriter, _ctx: &WriteContext) {
        let mut attrs = base_attributes(&self.base);
        attrs
            .string("id", self.id.as_deref())
            .string("name", self.name.as_deref())
            .string("species", self.species.as_deref())
            .double("stoichiometry", self.stoichiometry)
            .required_bool("constant", self.constant, false);
        w.element("speciesReference", &attrs, |w| {
            write_sbase_children(w, &self.base)
        });
    }
}

impl SbmlElement for ModifierSpeciesReference {
    fn write_element(&self, w: &mut XmlWriter, _ctx: &WriteContext) {
        let mut attrs = base_attributes(&self.base);
        attrs
            .string("id", self.id.as_deref())
            .string("name", self.name.as_deref())
            .string("species", self.species.as_deref());
        w.element("modifierSpeciesReference", &attrs, |w| {
            write_sbase_children(w, &self.base)
        });
    }
}

impl SbmlElement for KineticLaw {
    fn write_element(&self, w: &mut XmlWriter, ctx: &WriteContext) {
        let attrs = base_attributes(&self.base);
        w.element("kineticLaw", &attrs, |w| {
            write_sbase_children(w, &self.base);
            write_optional_math(w, self.math.as_ref());
            write_list(w, "listOfLocalParameters", &self.local_parameters, ctx);
        });
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Events
// ────────────────────────────────────────────────────────────────────────────

impl SbmlElement for Event {
    fn write_element(&self, w: &mut XmlWriter, ctx: &WriteContext) {
        let mut attrs = base_attributes(&self.base);
        attrs
            .string("id", self.id.as_deref())
            .string("name", self.name.as_deref());
        if ctx.is_l3v1() {
            if self.use_values_from_trigger_time == Some(false) {
                attrs.boolean("useValuesFromTriggerTime", Some(false));
            }
        } else {
            attrs.required_bool("useValuesFromTriggerTime", self.use_values_from_trigger_time, true);
        }

        w.element("event", &attrs, |w| {
            write_sbase_children(w, &self.base);
            if let Some(trigger) = &self.trigger {
                trigger.write_element(w, ctx);
            }
            if let Some(priority) = &self.priority {
                priority.write_element(w, ctx);
            }
            if let Some(delay) = &self.delay {
                delay.write_element(w, ctx);
            }
            write_list(w, "listOfEventAssignments", &self.event_assignments, ctx);
        });
    }
}

impl SbmlElement for Trigger {
    fn write_element(&self, w: &mut XmlWriter, _ctx: &WriteContext) {
        let mut attrs = base_attributes(&self.base);
        attrs
            .required_bool("initialValue", self.initial_value, true)
            .required_bool("persistent", self.persistent, true);
        w.element("trigger", &attrs, |w| {
            write_sbase_children(w, &self.base);
            write_optional_math(w, self.math.as_ref());
        });
    }
}

impl SbmlElement for Priority {
    fn write_element(&self, w: &mut XmlWriter, _ctx: &WriteContext) {
        let attrs = base_attributes(&self.base);
        w.element("priority", &attrs, |w| {
            write_sbase_children(w, &self.base);
            write_optional_math(w, self.math.as_ref());
        });
    }
}

impl SbmlElement for Delay {
    fn write_element(&self, w: &mut XmlWriter, _ctx: &WriteContext) {
        let attrs = base_attributes(&self.base);
        w.element("delay", &attrs, |w| {
            write_sbase_children(w, &self.base);
            write_optional_math(w, self.math.as_ref());
        });
    }
}

impl SbmlElement for EventAssignment {
    fn write_element(&self, w: &mut XmlWriter, _ctx: &WriteContext) {
        let mut attrs = base_attributes(&self.base);
        attrs.string("variable", self.variable.as_deref());
        w.element("eventAssignment", &attrs, |w| {
            write_sbase_children(w, &self.base);
            write_optional_math(w, self.math.as_ref());
        });
    }
}
