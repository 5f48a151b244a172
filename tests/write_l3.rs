use camino::Utf8Path;
use pretty_assertions::assert_eq;
use rustysbml::generator::SbmlElement;
use rustysbml::{
    Document, ErrorCode, HasMath, SbmlWriter, UnitKind, write_sbml, write_sbml_to_string,
};

const XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

fn wrap_l3v1(body: &str) -> String {
    format!(
        "{}<sbml xmlns=\"http://www.sbml.org/sbml/level3/version1/core\" level=\"3\" version=\"1\">\n{}</sbml>\n",
        XML_DECL, body
    )
}

#[test]
fn program_name_and_version_always_succeed() {
    let mut w = SbmlWriter::new();
    assert!(w.set_program_name("sss"));
    assert!(w.set_program_name(""));
    assert!(w.set_program_version("sss"));
    assert!(w.set_program_version(""));
    assert_eq!(w.program_name(), None);
}

#[test]
fn program_comment_follows_declaration() {
    let mut w = SbmlWriter::new();
    w.set_program_name("rustysbml-tests");
    w.set_program_version("1.2");
    let doc = Document::new();
    assert_eq!(
        w.write_to_string(&doc),
        format!(
            "{}<!-- Created by rustysbml-tests version 1.2 -->\n\
             <sbml xmlns=\"http://www.sbml.org/sbml/level3/version1/core\" level=\"3\" version=\"1\"/>\n",
            XML_DECL
        )
    );
}

#[test]
fn compartment() {
    let mut doc = Document::new();
    let c = doc.create_model().create_compartment();
    c.id = Some("A".into());
    c.constant = Some(true);
    assert_eq!(c.to_sbml(), "<compartment id=\"A\" constant=\"true\"/>");
}

#[test]
fn compartment_spatial_dimensions() {
    let mut doc = Document::new();
    let c = doc.create_model().create_compartment();
    c.id = Some("A".into());
    c.constant = Some(false);
    c.spatial_dimensions = Some(2.1);
    assert_eq!(
        c.to_sbml(),
        "<compartment id=\"A\" spatialDimensions=\"2.1\" constant=\"false\"/>"
    );
    c.spatial_dimensions = None;
    assert_eq!(c.to_sbml(), "<compartment id=\"A\" constant=\"false\"/>");
}

#[test]
fn event_with_trigger_time_values() {
    let mut doc = Document::new();
    let e = doc.create_model().create_event();
    e.id = Some("e".into());
    e.use_values_from_trigger_time = Some(true);
    assert_eq!(e.to_sbml(), "<event id=\"e\"/>");
}

#[test]
fn event_with_delay() {
    let mut doc = Document::new();
    let e = doc.create_model().create_event();
    e.id = Some("e".into());
    e.use_values_from_trigger_time = Some(false);
    e.create_delay();
    assert_eq!(
        e.to_sbml(),
        "<event id=\"e\" useValuesFromTriggerTime=\"false\">\n  <delay/>\n</event>"
    );
}

#[test]
fn infinite_and_nan_parameter_values() {
    let mut doc = Document::new();
    let model = doc.create_model();
    for (value, text) in [
        (f64::INFINITY, "INF"),
        (f64::NAN, "NaN"),
        (f64::NEG_INFINITY, "-INF"),
        (3.31, "3.31"),
    ] {
        let p = model.create_parameter();
        p.id = Some("p".into());
        p.value = Some(value);
        assert_eq!(
            p.to_sbml(),
            format!("<parameter id=\"p\" value=\"{}\" constant=\"true\"/>", text)
        );
    }
}

#[test]
fn parameter_with_units() {
    let mut doc = Document::new();
    let p = doc.create_model().create_parameter();
    p.id = Some("Km1".into());
    p.value = Some(2.3);
    p.units = Some("second".into());
    p.constant = Some(true);
    assert_eq!(
        p.to_sbml(),
        "<parameter id=\"Km1\" value=\"2.3\" units=\"second\" constant=\"true\"/>"
    );
}

#[test]
fn kinetic_law_local_parameters() {
    let mut doc = Document::new();
    let kl = doc.create_model().create_reaction().create_kinetic_law();
    let p = kl.create_local_parameter();
    p.id = Some("n".into());
    p.value = Some(1.2);
    assert_eq!(
        kl.to_sbml(),
        "<kineticLaw>\n  <listOfLocalParameters>\n    <localParameter id=\"n\" value=\"1.2\"/>\n  </listOfLocalParameters>\n</kineticLaw>"
    );
}

#[test]
fn empty_model() {
    let mut doc = Document::new();
    doc.create_model_with_id("");
    assert_eq!(write_sbml_to_string(&doc), wrap_l3v1("  <model/>\n"));
}

#[test]
fn model_unit_attributes() {
    let cases: [(&str, fn(&mut rustysbml::Model)); 4] = [
        ("  <model conversionFactor=\"p\"/>\n", |m| {
            m.conversion_factor = Some("p".into())
        }),
        (
            "  <model volumeUnits=\"litre\" areaUnits=\"area\" lengthUnits=\"metre\"/>\n",
            |m| {
                m.volume_units = Some("litre".into());
                m.area_units = Some("area".into());
                m.length_units = Some("metre".into());
            },
        ),
        ("  <model substanceUnits=\"mole\"/>\n", |m| {
            m.substance_units = Some("mole".into())
        }),
        ("  <model timeUnits=\"second\"/>\n", |m| {
            m.time_units = Some("second".into())
        }),
    ];
    for (body, set) in cases {
        let mut doc = Document::new();
        set(doc.create_model_with_id(""));
        assert_eq!(write_sbml_to_string(&doc), wrap_l3v1(body));
    }
}

#[test]
fn reaction_flags() {
    let mut doc = Document::new();
    let r = doc.create_model().create_reaction();
    r.id = Some("r".into());
    r.reversible = Some(false);
    r.fast = Some(true);
    assert_eq!(r.to_sbml(), "<reaction id=\"r\" reversible=\"false\" fast=\"true\"/>");
    r.compartment = Some("c".into());
    assert_eq!(
        r.to_sbml(),
        "<reaction id=\"r\" reversible=\"false\" fast=\"true\" compartment=\"c\"/>"
    );
    r.compartment = None;
    assert_eq!(r.to_sbml(), "<reaction id=\"r\" reversible=\"false\" fast=\"true\"/>");
}

#[test]
fn reaction_full() {
    let mut doc = Document::new();
    let r = doc.create_model().create_reaction();
    r.id = Some("v1".into());
    r.reversible = Some(true);
    r.create_reactant().species = Some("x0".into());
    r.create_product().species = Some("s1".into());
    r.create_modifier().species = Some("m1".into());
    r.create_kinetic_law()
        .set_formula("(vm * s1)/(km + s1)")
        .unwrap();

    let expected = "<reaction id=\"v1\" reversible=\"true\" fast=\"false\">
  <listOfReactants>
    <speciesReference species=\"x0\" constant=\"false\"/>
  </listOfReactants>
  <listOfProducts>
    <speciesReference species=\"s1\" constant=\"false\"/>
  </listOfProducts>
  <listOfModifiers>
    <modifierSpeciesReference species=\"m1\"/>
  </listOfModifiers>
  <kineticLaw>
    <math xmlns=\"http://www.w3.org/1998/Math/MathML\">
      <apply>
        <divide/>
        <apply>
          <times/>
          <ci> vm </ci>
          <ci> s1 </ci>
        </apply>
        <apply>
          <plus/>
          <ci> km </ci>
          <ci> s1 </ci>
        </apply>
      </apply>
    </math>
  </kineticLaw>
</reaction>";
    assert_eq!(r.to_sbml(), expected);
}

#[test]
fn empty_document() {
    let doc = Document::new();
    assert_eq!(
        write_sbml_to_string(&doc),
        format!(
            "{}<sbml xmlns=\"http://www.sbml.org/sbml/level3/version1/core\" level=\"3\" version=\"1\"/>\n",
            XML_DECL
        )
    );
}

#[test]
fn species() {
    let mut doc = Document::new();
    let s = doc.create_model().create_species();
    s.id = Some("Ca2".into());
    s.compartment = Some("cell".into());
    s.set_initial_amount(0.7);
    s.substance_units = Some("mole".into());
    s.boundary_condition = Some(true);
    s.has_only_substance_units = Some(false);
    s.constant = Some(true);
    assert_eq!(
        s.to_sbml(),
        "<species id=\"Ca2\" compartment=\"cell\" initialAmount=\"0.7\" substanceUnits=\"mole\" \
         hasOnlySubstanceUnits=\"false\" boundaryCondition=\"true\" constant=\"true\"/>"
    );
}

#[test]
fn species_conversion_factor() {
    let mut doc = Document::new();
    let s = doc.create_model().create_species();
    s.id = Some("Ca2".into());
    s.compartment = Some("cell".into());
    s.boundary_condition = Some(true);
    s.has_only_substance_units = Some(false);
    s.constant = Some(true);
    s.conversion_factor = Some("p".into());
    assert_eq!(
        s.to_sbml(),
        "<species id=\"Ca2\" compartment=\"cell\" hasOnlySubstanceUnits=\"false\" \
         boundaryCondition=\"true\" constant=\"true\" conversionFactor=\"p\"/>"
    );
    s.conversion_factor = None;
    assert_eq!(
        s.to_sbml(),
        "<species id=\"Ca2\" compartment=\"cell\" hasOnlySubstanceUnits=\"false\" \
         boundaryCondition=\"true\" constant=\"true\"/>"
    );
}

#[test]
fn species_reference() {
    let mut doc = Document::new();
    let sr = doc.create_model().create_reaction().create_reactant();
    sr.species = Some("s".into());
    sr.stoichiometry = Some(3.0);
    sr.constant = Some(true);
    assert_eq!(
        sr.to_sbml(),
        "<speciesReference species=\"s\" stoichiometry=\"3\" constant=\"true\"/>"
    );
}

#[test]
fn unit() {
    let mut doc = Document::new();
    let u = doc.create_model().create_unit_definition().create_unit();
    u.kind = Some(UnitKind::Kilogram);
    u.exponent = Some(0.2);
    u.scale = Some(-3);
    u.multiplier = Some(3.2);
    assert_eq!(
        u.to_sbml(),
        "<unit kind=\"kilogram\" exponent=\"0.2\" scale=\"-3\" multiplier=\"3.2\"/>"
    );
}

#[test]
fn unit_definition() {
    let mut doc = Document::new();
    let ud = doc.create_model().create_unit_definition();
    ud.id = Some("myUnit".into());
    let u = ud.create_unit();
    u.kind = UnitKind::from_name("mole");
    u.multiplier = Some(1.8);
    u.scale = Some(0);
    u.exponent = Some(1.0);
    assert_eq!(
        ud.to_sbml(),
        "<unitDefinition id=\"myUnit\">\n  <listOfUnits>\n    \
         <unit kind=\"mole\" exponent=\"1\" scale=\"0\" multiplier=\"1.8\"/>\n  \
         </listOfUnits>\n</unitDefinition>"
    );
}

#[test]
fn unit_without_values() {
    let mut doc = Document::new();
    let u = doc.create_model().create_unit_definition().create_unit();
    assert_eq!(
        u.to_sbml(),
        "<unit kind=\"(Invalid UnitKind)\" exponent=\"NaN\" scale=\"2147483647\" multiplier=\"NaN\"/>"
    );
}

#[test]
fn lists_follow_schema_order() {
    let mut doc = Document::new();
    let m = doc.create_model();
    m.create_unit_definition();
    m.create_function_definition();
    m.create_compartment();
    m.create_event();
    m.create_parameter();
    m.create_algebraic_rule();
    m.create_initial_assignment();
    m.create_constraint();
    m.create_reaction();
    m.create_species();

    let expected = wrap_l3v1(
        "  <model>
    <listOfFunctionDefinitions>
      <functionDefinition/>
    </listOfFunctionDefinitions>
    <listOfUnitDefinitions>
      <unitDefinition/>
    </listOfUnitDefinitions>
    <listOfCompartments>
      <compartment constant=\"true\"/>
    </listOfCompartments>
    <listOfSpecies>
      <species hasOnlySubstanceUnits=\"false\" boundaryCondition=\"false\" constant=\"false\"/>
    </listOfSpecies>
    <listOfParameters>
      <parameter constant=\"true\"/>
    </listOfParameters>
    <listOfInitialAssignments>
      <initialAssignment/>
    </listOfInitialAssignments>
    <listOfRules>
      <algebraicRule/>
    </listOfRules>
    <listOfConstraints>
      <constraint/>
    </listOfConstraints>
    <listOfReactions>
      <reaction reversible=\"true\" fast=\"false\"/>
    </listOfReactions>
    <listOfEvents>
      <event/>
    </listOfEvents>
  </model>
",
    );
    assert_eq!(write_sbml_to_string(&doc), expected);
}

#[test]
fn unwritable_path_logs_one_error() {
    let mut doc = Document::new();
    let w = SbmlWriter::new();
    assert!(!w.write_to_file(&mut doc, Utf8Path::new("/tmp/impossible/path/should/fail")));
    assert_eq!(doc.num_errors(), 1);
    assert_eq!(doc.error(0).map(|e| e.code), Some(ErrorCode::XmlFileUnwritable));
    // message carries the io cause after the context
    let message = &doc.error(0).unwrap().message;
    assert!(
        message.starts_with("cannot create /tmp/impossible/path/should/fail: "),
        "{}",
        message
    );
}

#[test]
fn plain_file_matches_string_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.xml");
    let path = camino::Utf8PathBuf::from_path_buf(path).unwrap();

    let mut doc = Document::new();
    doc.create_model_with_id("m").create_compartment().id = Some("cell".into());
    assert!(write_sbml(&mut doc, &path));
    assert_eq!(doc.num_errors(), 0);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), write_sbml_to_string(&doc));
}
