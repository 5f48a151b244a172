//! In-memory SBML object graph.
//!
//! Every settable attribute is an `Option`: `Some` means the caller set it,
//! `None` means it was never set (or was unset again). The writer never
//! compares values against defaults to decide what to emit.
//!
//! Child elements are owned by their parent's `Vec`; the `create_*` methods
//! append a default element and return a mutable reference to it.

use crate::error::{ErrorCode, ErrorLog, SbmlError};
use crate::math::{AstNode, FormulaError, parse_formula};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Levels, versions and namespaces
// ────────────────────────────────────────────────────────────────────────────

/// Known SBML (level, version) pairs and their core namespace URIs.
pub const SBML_NAMESPACES: &[(u32, u32, &str)] = &[
    (1, 1, "http://www.sbml.org/sbml/level1"),
    (1, 2, "http://www.sbml.org/sbml/level1"),
    (2, 1, "http://www.sbml.org/sbml/level2"),
    (2, 2, "http://www.sbml.org/sbml/level2/version2"),
    (2, 3, "http://www.sbml.org/sbml/level2/version3"),
    (2, 4, "http://www.sbml.org/sbml/level2/version4"),
    (2, 5, "http://www.sbml.org/sbml/level2/version5"),
    (3, 1, "http://www.sbml.org/sbml/level3/version1/core"),
    (3, 2, "http://www.sbml.org/sbml/level3/version2/core"),
];

pub const DEFAULT_LEVEL: u32 = 3;
pub const DEFAULT_VERSION: u32 = 1;

pub fn namespace_uri(level: u32, version: u32) -> Option<&'static str> {
    SBML_NAMESPACES
        .iter()
        .find(|(l, v, _)| *l == level && *v == version)
        .map(|(_, _, uri)| *uri)
}

/// Whether documents can be built and written at this level and version.
pub fn is_supported(level: u32, version: u32) -> bool {
    level == 3 && (version == 1 || version == 2)
}

// ────────────────────────────────────────────────────────────────────────────
// Document
// ────────────────────────────────────────────────────────────────────────────

const SNAPSHOT_MAGIC: &[u8; 9] = b"RUSTYSBML";
const SNAPSHOT_VERSION: u32 = 1;

/// Root container: level, version, the model, and the error log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    level: u32,
    version: u32,
    /// Extra `xmlns:prefix="uri"` declarations on the `<sbml>` element, in
    /// output order.
    pub namespaces: IndexMap<String, String>,
    pub base: SBase,
    pub model: Option<Model>,
    #[serde(default)]
    errors: ErrorLog,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty Level 3 Version 1 document.
    pub fn new() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            version: DEFAULT_VERSION,
            namespaces: IndexMap::new(),
            base: SBase::default(),
            model: None,
            errors: ErrorLog::default(),
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Switch the target level and version. Unsupported pairs leave the
    /// document unchanged, log an [`ErrorCode::InvalidLevelVersion`] and
    /// return `false`.
    pub fn set_level_and_version(&mut self, level: u32, version: u32) -> bool {
        if !is_supported(level, version) {
            self.errors.add(SbmlError::new(
                ErrorCode::InvalidLevelVersion,
                format!(
                    "Level {} Version {} is not supported; documents are written at Level 3 Version 1 or 2",
                    level, version
                ),
            ));
            return false;
        }
        self.level = level;
        self.version = version;
        true
    }

    pub fn namespace_uri(&self) -> &'static str {
        namespace_uri(self.level, self.version).unwrap_or(SBML_NAMESPACES[7].2)
    }

    /// Declare an additional namespace on the root element.
    pub fn add_namespace(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.namespaces.insert(prefix.into(), uri.into());
    }

    /// Replace the model with an empty one and return it.
    pub fn create_model(&mut self) -> &mut Model {
        self.model.insert(Model::default())
    }

    /// Like [`Document::create_model`]; an empty `id` leaves the id unset.
    pub fn create_model_with_id(&mut self, id: &str) -> &mut Model {
        let model = self.create_model();
        if !id.is_empty() {
            model.id = Some(id.to_string());
        }
        model
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    pub fn model_mut(&mut self) -> Option<&mut Model> {
        self.model.as_mut()
    }

    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }

    pub fn errors_mut(&mut self) -> &mut ErrorLog {
        &mut self.errors
    }

    pub fn num_errors(&self) -> usize {
        self.errors.len()
    }

    pub fn error(&self, index: usize) -> Option<&SbmlError> {
        self.errors.get(index)
    }

    /// Save a binary snapshot of the whole document, error log included.
    pub fn save_to_binary<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let file = std::fs::File::create(path)?;
        let mut writer = std::io::BufWriter::new(file);
        std::io::Write::write_all(&mut writer, SNAPSHOT_MAGIC)?;
        std::io::Write::write_all(&mut writer, &SNAPSHOT_VERSION.to_le_bytes())?;
        bincode::serde::encode_into_std_write(self, &mut writer, bincode::config::standard())?;
        std::io::Write::flush(&mut writer)?;
        Ok(())
    }

    /// Load a snapshot written by [`Document::save_to_binary`], checking
    /// magic bytes and format version.
    pub fn load_from_binary<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)?;
        let mut reader = std::io::BufReader::new(file);
        let mut magic = [0u8; 9];
        std::io::Read::read_exact(&mut reader, &mut magic)?;
        if &magic != SNAPSHOT_MAGIC {
            anyhow::bail!("Invalid magic bytes: expected 'RUSTYSBML'");
        }
        let mut version_bytes = [0u8; 4];
        std::io::Read::read_exact(&mut reader, &mut version_bytes)?;
        let version = u32::from_le_bytes(version_bytes);
        if version != SNAPSHOT_VERSION {
            anyhow::bail!("Unsupported snapshot version: {}", version);
        }
        let doc: Document =
            bincode::serde::decode_from_std_read(&mut reader, bincode::config::standard())?;
        Ok(doc)
    }

    pub(crate) fn log(&mut self, error: SbmlError) {
        self.errors.add(error);
    }

    pub(crate) fn set_level_and_version_unchecked(&mut self, level: u32, version: u32) {
        self.level = level;
        self.version = version;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SBase
// ────────────────────────────────────────────────────────────────────────────

/// Attributes and children every SBML element may carry.
///
/// `notes` and `annotation` hold complete XML fragments (including their own
/// `<notes>` / `<annotation>` wrapper), written verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SBase {
    pub metaid: Option<String>,
    pub sbo_term: Option<u32>,
    pub notes: Option<String>,
    pub annotation: Option<String>,
}

impl SBase {
    pub fn unset_notes(&mut self) {
        self.notes = None;
    }

    pub fn unset_annotation(&mut self) {
        self.annotation = None;
    }
}

/// Elements carrying a `<math>` child.
pub trait HasMath {
    fn math(&self) -> Option<&AstNode>;
    fn math_mut(&mut self) -> &mut Option<AstNode>;

    /// Parse an infix formula and store it as this element's math.
    fn set_formula(&mut self, formula: &str) -> Result<(), FormulaError> {
        *self.math_mut() = Some(parse_formula(formula)?);
        Ok(())
    }

    /// The math rendered back as infix text.
    fn formula(&self) -> Option<String> {
        self.math().map(AstNode::to_formula)
    }
}

macro_rules! impl_has_math {
    ($($ty:ty),* $(,)?) => {
        $(
            impl HasMath for $ty {
                fn math(&self) -> Option<&AstNode> {
                    self.math.as_ref()
                }
                fn math_mut(&mut self) -> &mut Option<AstNode> {
                    &mut self.math
                }
            }
        )*
    };
}

impl_has_math!(
    FunctionDefinition,
    InitialAssignment,
    Rule,
    Constraint,
    KineticLaw,
    Trigger,
    Priority,
    Delay,
    EventAssignment,
);

// ────────────────────────────────────────────────────────────────────────────
// Model
// ────────────────────────────────────────────────────────────────────────────

/// The model and its component lists. List order is insertion order; the
/// order of the lists themselves in the output is fixed by the writer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub base: SBase,
    pub id: Option<String>,
    pub name: Option<String>,
    pub substance_units: Option<String>,
    pub time_units: Option<String>,
    pub volume_units: Option<String>,
    pub area_units: Option<String>,
    pub length_units: Option<String>,
    pub extent_units: Option<String>,
    pub conversion_factor: Option<String>,

    pub function_definitions: Vec<FunctionDefinition>,
    pub unit_definitions: Vec<UnitDefinition>,
    pub compartments: Vec<Compartment>,
    pub species: Vec<Species>,
    pub parameters: Vec<Parameter>,
    pub initial_assignments: Vec<InitialAssignment>,
    pub rules: Vec<Rule>,
    pub constraints: Vec<Constraint>,
    pub reactions: Vec<Reaction>,
    pub events: Vec<Event>,
}

fn push_default<T: Default>(list: &mut Vec<T>) -> &mut T {
    list.push(T::default());
    let last = list.len() - 1;
    &mut list[last]
}

impl Model {
    pub fn create_function_definition(&mut self) -> &mut FunctionDefinition {
        push_default(&mut self.function_definitions)
    }

    pub fn create_unit_definition(&mut self) -> &mut UnitDefinition {
        push_default(&mut self.unit_definitions)
    }

    pub fn create_compartment(&mut self) -> &mut Compartment {
        push_default(&mut self.compartments)
    }

    pub fn create_species(&mut self) -> &mut Species {
        push_default(&mut self.species)
    }

    pub fn create_parameter(&mut self) -> &mut Parameter {
        push_default(&mut self.parameters)
    }

    pub fn create_initial_assignment(&mut self) -> &mut InitialAssignment {
        push_default(&mut self.initial_assignments)
    }

    pub fn create_rule(&mut self, kind: RuleKind) -> &mut Rule {
        self.rules.push(Rule::new(kind));
        let last = self.rules.len() - 1;
        &mut self.rules[last]
    }

    pub fn create_algebraic_rule(&mut self) -> &mut Rule {
        self.create_rule(RuleKind::Algebraic)
    }

    pub fn create_assignment_rule(&mut self) -> &mut Rule {
        self.create_rule(RuleKind::Assignment)
    }

    pub fn create_rate_rule(&mut self) -> &mut Rule {
        self.create_rule(RuleKind::Rate)
    }

    pub fn create_constraint(&mut self) -> &mut Constraint {
        push_default(&mut self.constraints)
    }

    pub fn create_reaction(&mut self) -> &mut Reaction {
        push_default(&mut self.reactions)
    }

    pub fn create_event(&mut self) -> &mut Event {
        push_default(&mut self.events)
    }

    pub fn compartment(&self, id: &str) -> Option<&Compartment> {
        self.compartments.iter().find(|c| c.id.as_deref() == Some(id))
    }

    pub fn species_by_id(&self, id: &str) -> Option<&Species> {
        self.species.iter().find(|s| s.id.as_deref() == Some(id))
    }

    pub fn parameter(&self, id: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.id.as_deref() == Some(id))
    }

    pub fn reaction(&self, id: &str) -> Option<&Reaction> {
        self.reactions.iter().find(|r| r.id.as_deref() == Some(id))
    }

    /// True when none of the component lists has entries.
    pub fn is_empty(&self) -> bool {
        self.function_definitions.is_empty()
            && self.unit_definitions.is_empty()
            && self.compartments.is_empty()
            && self.species.is_empty()
            && self.parameters.is_empty()
            && self.initial_assignments.is_empty()
            && self.rules.is_empty()
            && self.constraints.is_empty()
            && self.reactions.is_empty()
            && self.events.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Function and unit definitions
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub base: SBase,
    pub id: Option<String>,
    pub name: Option<String>,
    /// Normally a [`AstNode::Lambda`].
    pub math: Option<AstNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitDefinition {
    pub base: SBase,
    pub id: Option<String>,
    pub name: Option<String>,
    pub units: Vec<Unit>,
}

impl UnitDefinition {
    pub fn create_unit(&mut self) -> &mut Unit {
        push_default(&mut self.units)
    }
}

/// One factor of a unit definition: `(multiplier * 10^scale * kind)^exponent`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub base: SBase,
    pub kind: Option<UnitKind>,
    pub exponent: Option<f64>,
    pub scale: Option<i32>,
    pub multiplier: Option<f64>,
}

/// Level 3 base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    Ampere,
    Avogadro,
    Becquerel,
    Candela,
    Coulomb,
    Dimensionless,
    Farad,
    Gram,
    Gray,
    Henry,
    Hertz,
    Item,
    Joule,
    Katal,
    Kelvin,
    Kilogram,
    Litre,
    Lumen,
    Lux,
    Metre,
    Mole,
    Newton,
    Ohm,
    Pascal,
    Radian,
    Second,
    Siemens,
    Sievert,
    Steradian,
    Tesla,
    Volt,
    Watt,
    Weber,
}

const UNIT_KIND_NAMES: &[(UnitKind, &str)] = &[
    (UnitKind::Ampere, "ampere"),
    (UnitKind::Avogadro, "avogadro"),
    (UnitKind::Becquerel, "becquerel"),
    (UnitKind::Candela, "candela"),
    (UnitKind::Coulomb, "coulomb"),
    (UnitKind::Dimensionless, "dimensionless"),
    (UnitKind::Farad, "farad"),
    (UnitKind::Gram, "gram"),
    (UnitKind::Gray, "gray"),
    (UnitKind::Henry, "henry"),
    (UnitKind::Hertz, "hertz"),
    (UnitKind::Item, "item"),
    (UnitKind::Joule, "joule"),
    (UnitKind::Katal, "katal"),
    (UnitKind::Kelvin, "kelvin"),
    (UnitKind::Kilogram, "kilogram"),
    (UnitKind::Litre, "litre"),
    (UnitKind::Lumen, "lumen"),
    (UnitKind::Lux, "lux"),
    (UnitKind::Metre, "metre"),
    (UnitKind::Mole, "mole"),
    (UnitKind::Newton, "newton"),
    (UnitKind::Ohm, "ohm"),
    (UnitKind::Pascal, "pascal"),
    (UnitKind::Radian, "radian"),
    (UnitKind::Second, "second"),
    (UnitKind::Siemens, "siemens"),
    (UnitKind::Sievert, "sievert"),
    (UnitKind::Steradian, "steradian"),
    (UnitKind::Tesla, "tesla"),
    (UnitKind::Volt, "volt"),
    (UnitKind::Watt, "watt"),
    (UnitKind::Weber, "weber"),
];

impl UnitKind {
    pub fn name(self) -> &'static str {
        UNIT_KIND_NAMES
            .iter()
            .find(|(k, _)| *k == self)
            .map(|(_, n)| *n)
            .unwrap_or("(Invalid UnitKind)")
    }

    /// Look up a unit by its SBML name. `None` for anything that is not a
    /// Level 3 base unit.
    pub fn from_name(name: &str) -> Option<UnitKind> {
        UNIT_KIND_NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(k, _)| *k)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Compartments, species, parameters
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Compartment {
    pub base: SBase,
    pub id: Option<String>,
    pub name: Option<String>,
    pub spatial_dimensions: Option<f64>,
    pub size: Option<f64>,
    pub units: Option<String>,
    /// Required; written as `true` when unset.
    pub constant: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub base: SBase,
    pub id: Option<String>,
    pub name: Option<String>,
    pub compartment: Option<String>,
    pub initial_amount: Option<f64>,
    pub initial_concentration: Option<f64>,
    pub substance_units: Option<String>,
    /// Required; written as `false` when unset.
    pub has_only_substance_units: Option<bool>,
    /// Required; written as `false` when unset.
    pub boundary_condition: Option<bool>,
    /// Required; written as `false` when unset.
    pub constant: Option<bool>,
    pub conversion_factor: Option<String>,
}

impl Species {
    /// Setting the initial amount clears the initial concentration.
    pub fn set_initial_amount(&mut self, value: f64) {
        self.initial_amount = Some(value);
        self.initial_concentration = None;
    }

    /// Setting the initial concentration clears the initial amount.
    pub fn set_initial_concentration(&mut self, value: f64) {
        self.initial_concentration = Some(value);
        self.initial_amount = None;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub base: SBase,
    pub id: Option<String>,
    pub name: Option<String>,
    pub value: Option<f64>,
    pub units: Option<String>,
    /// Required; written as `true` when unset.
    pub constant: Option<bool>,
}

/// Parameter scoped to a kinetic law. Has no `constant` attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalParameter {
    pub base: SBase,
    pub id: Option<String>,
    pub name: Option<String>,
    pub value: Option<f64>,
    pub units: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Assignments, rules, constraints
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InitialAssignment {
    pub base: SBase,
    pub symbol: Option<String>,
    pub math: Option<AstNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleKind {
    Algebraic,
    Assignment,
    Rate,
}

impl RuleKind {
    pub fn tag(self) -> &'static str {
        match self {
            RuleKind::Algebraic => "algebraicRule",
            RuleKind::Assignment => "assignmentRule",
            RuleKind::Rate => "rateRule",
        }
    }

    pub fn from_tag(tag: &str) -> Option<RuleKind> {
        match tag {
            "algebraicRule" => Some(RuleKind::Algebraic),
            "assignmentRule" => Some(RuleKind::Assignment),
            "rateRule" => Some(RuleKind::Rate),
            _ => None,
        }
    }
}

/// Algebraic, assignment or rate rule. `variable` is ignored for algebraic
/// rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub base: SBase,
    pub kind: RuleKind,
    pub variable: Option<String>,
    pub math: Option<AstNode>,
}

impl Rule {
    pub fn new(kind: RuleKind) -> Self {
        Self {
            base: SBase::default(),
            kind,
            variable: None,
            math: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub base: SBase,
    pub math: Option<AstNode>,
    /// Complete `<message>` fragment, written verbatim.
    pub message: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Reactions
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub base: SBase,
    pub id: Option<String>,
    pub name: Option<String>,
    /// Required; written as `true` when unset.
    pub reversible: Option<bool>,
    /// Required at Level 3 Version 1 (written as `false` when unset); not
    /// written at Version 2.
    pub fast: Option<bool>,
    pub compartment: Option<String>,
    pub reactants: Vec<SpeciesReference>,
    pub products: Vec<SpeciesReference>,
    pub modifiers: Vec<ModifierSpeciesReference>,
    pub kinetic_law: Option<KineticLaw>,
}

impl Reaction {
    pub fn create_reactant(&mut self) -> &mut SpeciesReference {
        push_default(&mut self.reactants)
    }

    pub fn create_product(&mut self) -> &mut SpeciesReference {
        push_default(&mut self.products)
    }

    pub fn create_modifier(&mut self) -> &mut ModifierSpeciesReference {
        push_default(&mut self.modifiers)
    }

    /// Replace the kinetic law with an empty one and return it.
    pub fn create_kinetic_law(&mut self) -> &mut KineticLaw {
        self.kinetic_law.insert(KineticLaw::default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeciesReference {
    pub base: SBase,
    pub id: Option<String>,
    pub name: Option<String>,
    pub species: Option<String>,
    pub stoichiometry: Option<f64>,
    /// Required; written as `false` when unset.
    pub constant: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModifierSpeciesReference {
    pub base: SBase,
    pub id: Option<String>,
    pub name: Option<String>,
    pub species: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KineticLaw {
    pub base: SBase,
    pub math: Option<AstNode>,
    pub local_parameters: Vec<LocalParameter>,
}

impl KineticLaw {
    pub fn create_local_parameter(&mut self) -> &mut LocalParameter {
        push_default(&mut self.local_parameters)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Events
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub base: SBase,
    pub id: Option<String>,
    pub name: Option<String>,
    /// At Level 3 Version 1 only an explicit `false` is written; at Version 2
    /// the attribute is required and written as `true` when unset.
    pub use_values_from_trigger_time: Option<bool>,
    pub trigger: Option<Trigger>,
    pub priority: Option<Priority>,
    pub delay: Option<Delay>,
    pub event_assignments: Vec<EventAssignment>,
}

impl Event {
    pub fn create_trigger(&mut self) -> &mut Trigger {
        self.trigger.insert(Trigger::default())
    }

    pub fn create_priority(&mut self) -> &mut Priority {
        self.priority.insert(Priority::default())
    }

    pub fn create_delay(&mut self) -> &mut Delay {
        self.delay.insert(Delay::default())
    }

    pub fn create_event_assignment(&mut self) -> &mut EventAssignment {
        push_default(&mut self.event_assignments)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub base: SBase,
    /// Required; written as `true` when unset.
    pub initial_value: Option<bool>,
    /// Required; written as `true` when unset.
    pub persistent: Option<bool>,
    pub math: Option<AstNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Priority {
    pub base: SBase,
    pub math: Option<AstNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delay {
    pub base: SBase,
    pub math: Option<AstNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventAssignment {
    pub base: SBase,
    pub variable: Option<String>,
    pub math: Option<AstNode>,
}
