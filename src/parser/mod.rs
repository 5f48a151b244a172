//! SBML Level 3 core reader.
//!
//! Loads documents in the shape this crate writes them, so that a written
//! file can be read back and written again unchanged. Problems never abort
//! the call; they end up in the returned document's error log:
//!
//! - unreadable or undecodable files: [`ErrorCode::XmlFileUnreadable`]
//! - malformed XML: [`ErrorCode::BadlyFormedXml`] with the parser position
//! - namespace / level / version mismatches: [`ErrorCode::InvalidNamespace`],
//!   [`ErrorCode::InvalidLevelVersion`]
//! - elements this reader does not know: [`ErrorCode::UnknownElement`]
//!   (a warning; the element is skipped)
//!
//! Sub-modules:
//!
//! - [`source`] – File I/O abstraction (plain and compressed files)

pub mod source;

pub use source::*;

use crate::error::{ErrorCode, SbmlError};
use crate::generator::attributes::{decode_bool, decode_double, decode_sbo_term};
use crate::generator::sink::Compression;
use crate::generator::xml_writer::dedent_fragment;
use crate::math::AstNode;
use crate::math::mathml::read_math;
use crate::model::*;
use camino::Utf8Path;
use roxmltree::Node;
use tracing::{debug, error, instrument, warn};

/// Read a document from a plain or compressed file.
pub fn read_sbml(path: impl AsRef<Utf8Path>) -> Document {
    let path = path.as_ref();
    let compression = Compression::from_path(path);
    if !compression.is_available() {
        let mut doc = Document::new();
        doc.log(SbmlError::new(
            ErrorCode::CompressionUnsupported,
            format!(
                "{} compression is not available in this build (reading {})",
                compression.name(),
                path
            ),
        ));
        return doc;
    }
    read_sbml_with(&mut FsSource, path)
}

/// Read a document through any [`ContentSource`].
#[instrument(skip(source))]
pub fn read_sbml_with<S: ContentSource>(source: &mut S, path: &Utf8Path) -> Document {
    match source.read_to_string(path) {
        Ok(text) => read_sbml_from_string(&text),
        Err(err) => {
            error!(error = ?err, "failed to read SBML document");
            let mut doc = Document::new();
            doc.log(SbmlError::new(ErrorCode::XmlFileUnreadable, format!("{:#}", err)));
            doc
        }
    }
}

/// Parse a document from SBML text.
pub fn read_sbml_from_string(text: &str) -> Document {
    let mut doc = Document::new();
    let tree = match roxmltree::Document::parse(text) {
        Ok(tree) => tree,
        Err(err) => {
            let pos = err.pos();
            doc.log(SbmlError::new(ErrorCode::BadlyFormedXml, err.to_string()).at(pos.row, pos.col));
            return doc;
        }
    };

    let mut loader = Loader {
        text,
        tree: &tree,
        errors: Vec::new(),
    };
    loader.document(tree.root_element(), &mut doc);
    for e in loader.errors {
        doc.log(e);
    }
    debug!(errors = doc.num_errors(), "loaded SBML document");
    doc
}

fn elements<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|c| c.is_element())
}

fn string(node: Node, name: &str) -> Option<String> {
    node.attribute(name).map(str::to_string)
}

fn is_sbase_child(node: Node) -> bool {
    matches!(node.tag_name().name(), "notes" | "annotation")
}

struct Loader<'t, 'input> {
    text: &'input str,
    tree: &'t roxmltree::Document<'input>,
    errors: Vec<SbmlError>,
}

impl Loader<'_, '_> {
    fn log(&mut self, node: Node, code: ErrorCode, message: impl Into<String>) {
        let pos = self.tree.text_pos_at(node.range().start);
        self.errors.push(SbmlError::new(code, message).at(pos.row, pos.col));
    }

    fn unknown(&mut self, node: Node) {
        let pos = self.tree.text_pos_at(node.range().start);
        let name = node.tag_name().name();
        let parent = node.parent_element().map(|p| p.tag_name().name()).unwrap_or("");
        warn!(element = name, inside = parent, line = pos.row, "skipping unknown element");
        self.log(
            node,
            ErrorCode::UnknownElement,
            format!("<{}> is not allowed inside <{}>", name, parent),
        );
    }

    /// Source text of the element, with the indentation of its position in
    /// the document removed from continuation lines.
    fn fragment(&self, node: Node) -> String {
        let range = node.range();
        let column = self.tree.text_pos_at(range.start).col.saturating_sub(1);
        dedent_fragment(&self.text[range], column as usize)
    }

    fn double(&mut self, node: Node, name: &str) -> Option<f64> {
        let raw = node.attribute(name)?;
        let value = decode_double(raw);
        if value.is_none() {
            self.log(
                node,
                ErrorCode::InvalidAttributeValue,
                format!("{}=\"{}\" is not a number", name, raw),
            );
        }
        value
    }

    fn boolean(&mut self, node: Node, name: &str) -> Option<bool> {
        let raw = node.attribute(name)?;
        let value = decode_bool(raw);
        if value.is_none() {
            self.log(
                node,
                ErrorCode::InvalidAttributeValue,
                format!("{}=\"{}\" is not a boolean", name, raw),
            );
        }
        value
    }

    fn integer(&mut self, node: Node, name: &str) -> Option<i32> {
        let raw = node.attribute(name)?;
        let value = raw.trim().parse().ok();
        if value.is_none() {
            self.log(
                node,
                ErrorCode::InvalidAttributeValue,
                format!("{}=\"{}\" is not an integer", name, raw),
            );
        }
        value
    }

    fn sbase(&mut self, node: Node) -> SBase {
        let sbo_term = match node.attribute("sboTerm") {
            Some(raw) => {
                let term = decode_sbo_term(raw);
                if term.is_none() {
                    self.log(
                        node,
                        ErrorCode::InvalidAttributeValue,
                        format!("sboTerm=\"{}\" is not of the form SBO:NNNNNNN", raw),
                    );
                }
                term
            }
            None => None,
        };
        let mut base = SBase {
            metaid: string(node, "metaid"),
            sbo_term,
            notes: None,
            annotation: None,
        };
        for child in elements(node) {
            match child.tag_name().name() {
                "notes" => base.notes = Some(self.fragment(child)),
                "annotation" => base.annotation = Some(self.fragment(child)),
                _ => {}
            }
        }
        base
    }

    fn math(&mut self, node: Node) -> Option<AstNode> {
        match read_math(node) {
            Ok(ast) => Some(ast),
            Err(err) => {
                self.log(node, ErrorCode::MathParseError, format!("{:#}", err));
                None
            }
        }
    }

    /// Elements whose only children are SBase children and one `<math>`.
    fn math_only(&mut self, node: Node) -> (SBase, Option<AstNode>) {
        let base = self.sbase(node);
        let mut math = None;
        for child in elements(node) {
            match child.tag_name().name() {
                "math" => math = self.math(child),
                _ if is_sbase_child(child) => {}
                _ => self.unknown(child),
            }
        }
        (base, math)
    }

    fn list<T>(
        &mut self,
        node: Node,
        item: &str,
        mut read: impl FnMut(&mut Self, Node<'_, '_>) -> T,
    ) -> Vec<T> {
        let mut items = Vec::new();
        for child in elements(node) {
            if child.tag_name().name() == item {
                items.push(read(&mut *self, child));
            } else if !is_sbase_child(child) {
                self.unknown(child);
            }
        }
        items
    }

    // ────────────────────────────────────────────────────────────────────
    // Document and model
    // ────────────────────────────────────────────────────────────────────

    fn document(&mut self, root: Node, doc: &mut Document) {
        if root.tag_name().name() != "sbml" {
            self.log(
                root,
                ErrorCode::BadlyFormedXml,
                format!("root element is <{}>, expected <sbml>", root.tag_name().name()),
            );
            return;
        }

        let level = root.attribute("level").and_then(|v| v.trim().parse::<u32>().ok());
        let version = root.attribute("version").and_then(|v| v.trim().parse::<u32>().ok());
        let (Some(level), Some(version)) = (level, version) else {
            self.log(
                root,
                ErrorCode::InvalidLevelVersion,
                "<sbml> must carry numeric level and version attributes",
            );
            return;
        };
        let Some(expected) = namespace_uri(level, version) else {
            self.log(
                root,
                ErrorCode::InvalidLevelVersion,
                format!("unknown SBML Level {} Version {}", level, version),
            );
            return;
        };
        let found = root.tag_name().namespace().unwrap_or("");
        if found != expected {
            self.log(
                root,
                ErrorCode::InvalidNamespace,
                format!(
                    "namespace \"{}\" does not match Level {} Version {} (expected \"{}\")",
                    found, level, version, expected
                ),
            );
            return;
        }
        if !is_supported(level, version) {
            self.log(
                root,
                ErrorCode::InvalidLevelVersion,
                format!("Level {} Version {} documents are not supported", level, version),
            );
            return;
        }
        doc.set_level_and_version_unchecked(level, version);

        for ns in root.namespaces() {
            if let Some(prefix) = ns.name() {
                if prefix != "xml" {
                    doc.add_namespace(prefix, ns.uri());
                }
            }
        }

        doc.base = self.sbase(root);
        for child in elements(root) {
            match child.tag_name().name() {
                "model" => doc.model = Some(self.model(child)),
                _ if is_sbase_child(child) => {}
                _ => self.unknown(child),
            }
        }
    }

    fn model(&mut self, node: Node) -> Model {
        let mut model = Model {
            base: self.sbase(node),
            id: string(node, "id"),
            name: string(node, "name"),
            substance_units: string(node, "substanceUnits"),
            time_units: string(node, "timeUnits"),
            volume_units: string(node, "volumeUnits"),
            area_units: string(node, "areaUnits"),
            length_units: string(node, "lengthUnits"),
            extent_units: string(node, "extentUnits"),
            conversion_factor: string(node, "conversionFactor"),
            ..Model::default()
        };

        for child in elements(node) {
            match child.tag_name().name() {
                "listOfFunctionDefinitions" => {
                    model.function_definitions =
                        self.list(child, "functionDefinition", Self::function_definition)
                }
                "listOfUnitDefinitions" => {
                    model.unit_definitions = self.list(child, "unitDefinition", Self::unit_definition)
                }
                "listOfCompartments" => {
                    model.compartments = self.list(child, "compartment", Self::compartment)
                }
                "listOfSpecies" => model.species = self.list(child, "species", Self::species),
                "listOfParameters" => {
                    model.parameters = self.list(child, "parameter", Self::parameter)
                }
                "listOfInitialAssignments" => {
                    model.initial_assignments =
                        self.list(child, "initialAssignment", Self::initial_assignment)
                }
                "listOfRules" => model.rules = self.rules(child),
                "listOfConstraints" => {
                    model.constraints = self.list(child, "constraint", Self::constraint)
                }
                "listOfReactions" => model.reactions = self.list(child, "reaction", Self::reaction),
                "listOfEvents" => model.events = self.list(child, "event", Self::event),
                _ if is_sbase_child(child) => {}
                _ => self.unknown(child),
            }
        }
        model
    }

    // ────────────────────────────────────────────────────────────────────
    // Definitions
    // ────────────────────────────────────────────────────────────────────

    fn function_definition(&mut self, node: Node) -> FunctionDefinition {
        let (base, math) = self.math_only(node);
        FunctionDefinition {
            base,
            id: string(node, "id"),
            name: string(node, "name"),
            math,
        }
    }

    fn unit_definition(&mut self, node: Node) -> UnitDefinition {
        let base = self.sbase(node);
        let mut units = Vec::new();
        for child in elements(node) {
            match child.tag_name().name() {
                "listOfUnits" => units = self.list(child, "unit", Self::unit),
                _ if is_sbase_child(child) => {}
                _ => self.unknown(child),
            }
        }
        UnitDefinition {
            base,
            id: string(node, "id"),
            name: string(node, "name"),
            units,
        }
    }

    fn unit(&mut self, node: Node) -> Unit {
        let kind = match node.attribute("kind") {
            Some(name) => {
                let kind = UnitKind::from_name(name);
                if kind.is_none() {
                    self.log(
                        node,
                        ErrorCode::InvalidUnitKind,
                        format!("\"{}\" is not a Level 3 base unit", name),
                    );
                }
                kind
            }
            None => None,
        };
        Unit {
            base: self.sbase(node),
            kind,
            // Unset values are written as NaN; read them back as unset.
            exponent: self.double(node, "exponent").filter(|v| !v.is_nan()),
            scale: self.integer(node, "scale").filter(|v| *v != i32::MAX),
            multiplier: self.double(node, "multiplier").filter(|v| !v.is_nan()),
        }
    }

    // ────────────────────────────────────────────────────────────────────
    // Compartments, species, parameters
    // ────────────────────────────────────────────────────────────────────

    fn compartment(&mut self, node: Node) -> Compartment {
        Compartment {
            base: self.sbase(node),
            id: string(node, "id"),
            name: string(node, "name"),
            spatial_dimensions: self.double(node, "spatialDimensions"),
            size: self.double(node, "size"),
            units: string(node, "units"),
            constant: self.boolean(node, "constant"),
        }
    }

    fn species(&mut self, node: Node) -> Species {
        Species {
            base: self.sbase(node),
            id: string(node, "id"),
            name: string(node, "name"),
            compartment: string(node, "compartment"),
            initial_amount: self.double(node, "initialAmount"),
            initial_concentration: self.double(node, "initialConcentration"),
            substance_units: string(node, "substanceUnits"),
            has_only_substance_units: self.boolean(node, "hasOnlySubstanceUnits"),
            boundary_condition: self.boolean(node, "boundaryCondition"),
            constant: self.boolean(node, "constant"),
            conversion_factor: string(node, "conversionFactor"),
        }
    }

    fn parameter(&mut self, node: Node) -> Parameter {
        Parameter {
            base: self.sbase(node),
            id: string(node, "id"),
            name: string(node, "name"),
            value: self.double(node, "value"),
            units: string(node, "units"),
            constant: self.boolean(node, "constant"),
        }
    }

    fn local_parameter(&mut self, node: Node) -> LocalParameter {
        LocalParameter {
            base: self.sbase(node),
            id: string(node, "id"),
            name: string(node, "name"),
            value: self.double(node, "value"),
            units: string(node, "units"),
        }
    }

    // ────────────────────────────────────────────────────────────────────
    // Assignments, rules, constraints
    // ────────────────────────────────────────────────────────────────────

    fn initial_assignment(&mut self, node: Node) -> InitialAssignment {
        let (base, math) = self.math_only(node);
        InitialAssignment {
            base,
            symbol: string(node, "symbol"),
            math,
        }
    }

    fn rules(&mut self, node: Node) -> Vec<Rule> {
        let mut rules = Vec::new();
        for child in elements(node) {
            match RuleKind::from_tag(child.tag_name().name()) {
                Some(kind) => {
                    let (base, math) = self.math_only(child);
                    rules.push(Rule {
                        base,
                        kind,
                        variable: string(child, "variable").filter(|_| kind != RuleKind::Algebraic),
                        math,
                    });
                }
                None if is_sbase_child(child) => {}
                None => self.unknown(child),
            }
        }
        rules
    }

    fn constraint(&mut self, node: Node) -> Constraint {
        let base = self.sbase(node);
        let mut constraint = Constraint {
            base,
            ..Constraint::default()
        };
        for child in elements(node) {
            match child.tag_name().name() {
                "math" => constraint.math = self.math(child),
                "message" => constraint.message = Some(self.fragment(child)),
                _ if is_sbase_child(child) => {}
                _ => self.unknown(child),
            }
        }
        constraint
    }

    // ────────────────────────────────────────────────────────────────────
    // Reactions
    // ────────────────────────────────────────────────────────────────────

    fn reaction(&mut self, node: Node) -> Reaction {
        let mut reaction = Reaction {
            base: self.sbase(node),
            id: string(node, "id"),
            name: string(node, "name"),
            reversible: self.boolean(node, "reversible"),
            fast: self.boolean(node, "fast"),
            compartment: string(node, "compartment"),
            ..Reaction::default()
        };
        for child in elements(node) {
            match child.tag_name().name() {
                "listOfReactants" => {
                    reaction.reactants = self.list(child, "speciesReference", Self::species_reference)
                }
                "listOfProducts" => {
                    reaction.products = self.list(child, "speciesReference", Self::species_reference)
                }
                "listOfModifiers" => {
                    reaction.modifiers =
                        self.list(child, "modifierSpeciesReference", Self::modifier_reference)
                }
                "kineticLaw" => reaction.kinetic_law = Some(self.kinetic_law(child)),
                _ if is_sbase_child(child) => {}
                _ => self.unknown(child),
            }
        }
        reaction
    }

    fn species_reference(&mut self, node: Node) -> SpeciesReference {
        SpeciesReference {
            base: self.sbase(node),
            id: string(node, "id"),
            name: string(node, "name"),
            species: string(node, "species"),
            stoichiometry: self.double(node, "stoichiometry"),
            constant: self.boolean(node, "constant"),
        }
    }

    fn modifier_reference(&mut self, node: Node) -> ModifierSpeciesReference {
        ModifierSpeciesReference {
            base: self.sbase(node),
            id: string(node, "id"),
            name: string(node, "name"),
            species: string(node, "species"),
        }
    }

    fn kinetic_law(&mut self, node: Node) -> KineticLaw {
        let mut law = KineticLaw {
            base: self.sbase(node),
            ..KineticLaw::default()
        };
        for child in elements(node) {
            match child.tag_name().name() {
                "math" => law.math = self.math(child),
                "listOfLocalParameters" => {
                    law.local_parameters = self.list(child, "localParameter", Self::local_parameter)
                }
                _ if is_sbase_child(child) => {}
                _ => self.unknown(child),
            }
        }
        law
    }

    // ────────────────────────────────────────────────────────────────────
    // Events
    // ────────────────────────────────────────────────────────────────────

    fn event(&mut self, node: Node) -> Event {
        let mut event = Event {
            base: self.sbase(node),
            id: string(node, "id"),
            name: string(node, "name"),
            use_values_from_trigger_time: self.boolean(node, "useValuesFromTriggerTime"),
            ..Event::default()
        };
        for child in elements(node) {
            match child.tag_name().name() {
                "trigger" => {
                    let (base, math) = self.math_only(child);
                    event.trigger = Some(Trigger {
                        base,
                        initial_value: self.boolean(child, "initialValue"),
                        persistent: self.boolean(child, "persistent"),
                        math,
                    });
                }
                "priority" => {
                    let (base, math) = self.math_only(child);
                    event.priority = Some(Priority { base, math });
                }
                "delay" => {
                    let (base, math) = self.math_only(child);
                    event.delay = Some(Delay { base, math });
                }
                "listOfEventAssignments" => {
                    event.event_assignments =
                        self.list(child, "eventAssignment", Self::event_assignment)
                }
                _ if is_sbase_child(child) => {}
                _ => self.unknown(child),
            }
        }
        event
    }

    fn event_assignment(&mut self, node: Node) -> EventAssignment {
        let (base, math) = self.math_only(node);
        EventAssignment {
            base,
            variable: string(node, "variable"),
            math,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_xml_is_logged_with_position() {
        let doc = read_sbml_from_string("<sbml>\n  <model>\n</sbml>");
        assert_eq!(doc.num_errors(), 1);
        let e = doc.error(0).unwrap();
        assert_eq!(e.code, ErrorCode::BadlyFormedXml);
        assert!(e.line > 0);
        assert!(doc.model().is_none());
    }

    #[test]
    fn level_two_documents_are_rejected() {
        let doc = read_sbml_from_string(
            "<sbml xmlns=\"http://www.sbml.org/sbml/level2/version4\" level=\"2\" version=\"4\"><model/></sbml>",
        );
        assert!(doc.errors().contains(ErrorCode::InvalidLevelVersion));
        assert!(doc.model().is_none());
    }

    #[test]
    fn namespace_must_match_level() {
        let doc = read_sbml_from_string(
            "<sbml xmlns=\"http://www.sbml.org/sbml/level3/version2/core\" level=\"3\" version=\"1\"/>",
        );
        assert!(doc.errors().contains(ErrorCode::InvalidNamespace));
    }

    #[test]
    fn unknown_elements_are_skipped_with_warning() {
        let doc = read_sbml_from_string(
            "<sbml xmlns=\"http://www.sbml.org/sbml/level3/version1/core\" level=\"3\" version=\"1\">\n\
             <model><listOfWidgets/><listOfCompartments><compartment id=\"c\" constant=\"true\"/></listOfCompartments></model>\n\
             </sbml>",
        );
        assert_eq!(doc.num_errors(), 1);
        assert_eq!(doc.error(0).map(|e| e.code), Some(ErrorCode::UnknownElement));
        assert_eq!(doc.model().map(|m| m.compartments.len()), Some(1));
    }

    #[test]
    fn bad_unit_kind_is_logged() {
        let doc = read_sbml_from_string(
            "<sbml xmlns=\"http://www.sbml.org/sbml/level3/version1/core\" level=\"3\" version=\"1\">\
             <model><listOfUnitDefinitions><unitDefinition id=\"u\"><listOfUnits>\
             <unit kind=\"celsius\" exponent=\"1\" scale=\"0\" multiplier=\"1\"/>\
             </listOfUnits></unitDefinition></listOfUnitDefinitions></model></sbml>",
        );
        assert!(doc.errors().contains(ErrorCode::InvalidUnitKind));
        let unit = &doc.model().unwrap().unit_definitions[0].units[0];
        assert_eq!(unit.kind, None);
        assert_eq!(unit.exponent, Some(1.0));
    }

    #[test]
    fn notes_keep_their_markup() {
        let text = "<sbml xmlns=\"http://www.sbml.org/sbml/level3/version1/core\" level=\"3\" version=\"1\">\n  \
                    <model id=\"m\">\n    \
                    <notes>\n      \
                    <p xmlns=\"http://www.w3.org/1999/xhtml\">A &amp; B</p>\n    \
                    </notes>\n  \
                    </model>\n\
                    </sbml>\n";
        let doc = read_sbml_from_string(text);
        assert_eq!(doc.num_errors(), 0);
        assert_eq!(
            doc.model().and_then(|m| m.base.notes.as_deref()),
            Some("<notes>\n  <p xmlns=\"http://www.w3.org/1999/xhtml\">A &amp; B</p>\n</notes>")
        );
    }

    #[test]
    fn deeply_nested_math_is_logged_not_fatal() {
        let levels = 2000;
        let text = format!(
            "<sbml xmlns=\"http://www.sbml.org/sbml/level3/version1/core\" level=\"3\" version=\"1\">\
             <model><listOfParameters><parameter id=\"x\" constant=\"false\"/></listOfParameters>\
             <listOfRules><assignmentRule variable=\"x\">\
             <math xmlns=\"http://www.w3.org/1998/Math/MathML\">{}<ci>x</ci>{}</math>\
             </assignmentRule></listOfRules></model></sbml>",
            "<apply><minus/>".repeat(levels),
            "</apply>".repeat(levels)
        );
        let doc = read_sbml_from_string(&text);
        assert_eq!(doc.error(0).map(|e| e.code), Some(ErrorCode::MathParseError));
        let rule = &doc.model().unwrap().rules[0];
        assert_eq!(rule.variable.as_deref(), Some("x"));
        assert!(rule.math.is_none());
    }

    #[test]
    fn missing_file_is_unreadable() {
        let doc = read_sbml("/nonexistent/dir/model.xml");
        assert_eq!(doc.error(0).map(|e| e.code), Some(ErrorCode::XmlFileUnreadable));
    }
}
