//! Integration tests for the template registry and value-set sync

use confgen::{ConfigTemplate, Project, RegistryError, TemplateValueSet};

#[test]
fn test_template_scenario_end_to_end() {
    let mut template = ConfigTemplate::with_content("base", "host: ${hostname}\nport: ${port}");
    assert_eq!(template.variable_names(), vec!["hostname", "port"]);

    template.add_value_set("r1").expect("Should create");
    {
        let value_set = template.value_set("r1").expect("Should exist");
        assert_eq!(value_set.value_names(), vec!["hostname", "port"]);
        assert_eq!(value_set.value("hostname").expect("Should exist"), "r1");
        assert_eq!(value_set.value("port").expect("Should exist"), "");
    }

    template
        .value_set_mut("r1")
        .expect("Should exist")
        .update_value("port", "22");

    let output = template.render_value_set("r1").expect("Should render");
    assert_eq!(output, "host: r1\nport: 22");
}

#[test]
fn test_update_variable_and_lookup() {
    let mut first = ConfigTemplate::new("first script");
    let mut second = ConfigTemplate::new("second script");

    assert!(!first.is_variable_defined("first variable"));
    assert!(!second.is_variable_defined("first variable"));

    first.update_variable("first variable", "description for first P1 variable");
    first.update_variable("second variable", "description for second P1 variable");
    second.update_variable("first variable", "description for first P2 variable");

    // hostname plus the two declared variables
    assert_eq!(first.variable_names().len(), 3);
    assert_eq!(second.variable_names().len(), 2);
    assert!(first.is_variable_defined("first variable"));
    assert!(first.is_variable_defined("second variable"));
    assert!(second.is_variable_defined("first variable"));

    let declaration = first.variable("first variable").expect("Should exist");
    assert_eq!(declaration.name(), "first_variable");
    assert_eq!(declaration.description(), "description for first P1 variable");

    let err = first.variable("unknown key").expect_err("Should fail");
    assert!(matches!(err, RegistryError::VariableNotFound { .. }));
}

#[test]
fn test_update_variable_overwrites_description() {
    let mut template = ConfigTemplate::new("first script");
    template.update_variable("first variable", "initial description");
    template.update_variable("first variable", "modified description");

    assert_eq!(
        template
            .variable("first variable")
            .expect("Should exist")
            .description(),
        "modified description"
    );
    // still one declaration beside hostname
    assert_eq!(template.variable_names().len(), 2);
}

#[test]
fn test_content_change_drops_value_sets() {
    let mut template = ConfigTemplate::with_content("base", "a ${ x }");
    template.add_value_set("r1").expect("Should create");
    template.add_value_set("r2").expect("Should create");
    assert_eq!(template.value_set_hostnames(), vec!["r1", "r2"]);

    template.set_content("b ${ y }");
    assert!(template.value_set_hostnames().is_empty());
    assert!(template.is_variable_defined("y"));
    // declarations are add-only, the stale one survives
    assert!(template.is_variable_defined("x"));
}

#[test]
fn test_unchanged_content_keeps_value_sets() {
    let mut template = ConfigTemplate::with_content("base", "a ${ x }");
    template.add_value_set("r1").expect("Should create");

    template.set_content("a ${ x }");
    assert_eq!(template.value_set_hostnames(), vec!["r1"]);
}

#[test]
fn test_duplicate_value_set_rejected() {
    let mut template = ConfigTemplate::new("base");
    template.add_value_set("r1").expect("Should create");
    let err = template.add_value_set("r1").expect_err("Should fail");
    assert!(matches!(err, RegistryError::DuplicateValueSet { .. }));
}

#[test]
fn test_reconciliation_is_idempotent() {
    let mut template = ConfigTemplate::with_content("base", "${ port } ${ vlan }");
    template.add_value_set("r1").expect("Should create");
    template
        .value_set_mut("r1")
        .expect("Should exist")
        .update_value("port", "22");

    template.reconcile_value_sets().expect("Should reconcile");
    let before = template.value_set("r1").expect("Should exist").clone();

    template.reconcile_value_sets().expect("Should reconcile");
    let after = template.value_set("r1").expect("Should exist");

    assert_eq!(&before, after);
    assert_eq!(after.value("port").expect("Should exist"), "22");
}

#[test]
fn test_reconcile_covers_manually_declared_variables() {
    let mut template = ConfigTemplate::new("base");
    template.add_value_set("r1").expect("Should create");

    template.update_variable("ntp server", "primary NTP");
    template.reconcile_value_sets().expect("Should reconcile");

    let value_set = template.value_set("r1").expect("Should exist");
    assert_eq!(value_set.value("ntp_server").expect("Should exist"), "");
}

#[test]
fn test_reconcile_forces_hostname_value() {
    let mut template = ConfigTemplate::new("base");
    template.add_value_set("r1").expect("Should create");

    template
        .value_set_mut("r1")
        .expect("Should exist")
        .update_value("hostname", "something else");
    template.reconcile_value_sets().expect("Should reconcile");

    assert_eq!(
        template
            .value_set("r1")
            .expect("Should exist")
            .value("hostname")
            .expect("Should exist"),
        "r1"
    );
}

#[test]
fn test_rename_preserves_value() {
    let mut template = ConfigTemplate::new("base");
    template.update_variable("old", "");
    template.add_value_set("r1").expect("Should create");
    template
        .value_set_mut("r1")
        .expect("Should exist")
        .update_value("old", "V");

    let renamed = template.rename_variable("old", "new").expect("Should rename");
    assert_eq!(renamed, "new");
    assert!(template.is_variable_defined("new"));
    assert!(!template.is_variable_defined("old"));

    let value_set = template.value_set("r1").expect("Should exist");
    assert_eq!(value_set.value("new").expect("Should exist"), "V");

    let err = value_set.value("old").expect_err("Should fail");
    assert!(matches!(err, RegistryError::ValueNotFound { .. }));
}

#[test]
fn test_rename_keeps_description() {
    let mut template = ConfigTemplate::new("base");
    template.update_variable("old", "keeps its text");
    template.rename_variable("old", "new").expect("Should rename");

    assert_eq!(
        template.variable("new").expect("Should exist").description(),
        "keeps its text"
    );
}

#[test]
fn test_rename_normalizes_both_names() {
    let mut template = ConfigTemplate::new("base");
    template.update_variable("Mgmt IP", "");

    let renamed = template
        .rename_variable("mgmt ip", "Loopback IP")
        .expect("Should rename");
    assert_eq!(renamed, "loopback_ip");
}

#[test]
fn test_rename_unknown_variable_fails() {
    let mut template = ConfigTemplate::new("base");
    let err = template
        .rename_variable("ghost", "anything")
        .expect_err("Should fail");
    assert!(matches!(err, RegistryError::VariableNotFound { .. }));
}

#[test]
fn test_rename_to_existing_name_fails() {
    let mut template = ConfigTemplate::new("base");
    template.update_variable("a", "");
    template.update_variable("b", "");

    let err = template.rename_variable("a", "b").expect_err("Should fail");
    assert!(matches!(err, RegistryError::DuplicateVariable { .. }));
    // nothing moved
    assert!(template.is_variable_defined("a"));
    assert!(template.is_variable_defined("b"));
}

#[test]
fn test_unbound_value_set_cannot_copy_variables() {
    let mut value_set = TemplateValueSet::new("r1");
    assert!(value_set.template().is_none());

    let err = value_set
        .copy_variables_from_template(std::iter::empty())
        .expect_err("Should fail");
    assert!(matches!(err, RegistryError::TemplateNotBound { .. }));
}

#[test]
fn test_value_set_binding_records_template_name() {
    let mut template = ConfigTemplate::new("edge");
    template.add_value_set("r1").expect("Should create");
    assert_eq!(
        template.value_set("r1").expect("Should exist").template(),
        Some("edge")
    );
}

#[test]
fn test_render_value_set_with_conditional() {
    let content = "hostname ${hostname}\n\
                   % if banner:\n\
                   banner motd ${banner}\n\
                   % endif";
    let mut template = ConfigTemplate::with_content("edge", content);
    template.add_value_set("r1").expect("Should create");
    assert_eq!(
        template.render_value_set("r1").expect("Should render"),
        "hostname r1"
    );

    template
        .value_set_mut("r1")
        .expect("Should exist")
        .update_value("banner", "unauthorized access prohibited");
    assert_eq!(
        template.render_value_set("r1").expect("Should render"),
        "hostname r1\nbanner motd unauthorized access prohibited"
    );
}

#[test]
fn test_render_unknown_value_set_fails() {
    let template = ConfigTemplate::new("edge");
    let err = template.render_value_set("ghost").expect_err("Should fail");
    assert!(matches!(
        err,
        confgen::Error::Registry(RegistryError::ValueSetNotFound { .. })
    ));
}

#[test]
fn test_project_owns_templates() {
    let mut project = Project::new("First Test Project");
    assert!(project.template_names().is_empty());

    let mut template = ConfigTemplate::with_content("edge", "host ${ port }");
    template.add_value_set("r1").expect("Should create");
    project.add_template(template).expect("Should add");

    assert_eq!(project.template_names(), vec!["edge"]);
    assert!(!project.valid_template_name("edge"));
    assert!(project.valid_template_name("core"));

    project
        .template_mut("edge")
        .expect("Should exist")
        .update_variable("vlan", "");
    assert!(project
        .template("edge")
        .expect("Should exist")
        .is_variable_defined("vlan"));

    assert!(project.remove_template("edge"));
    assert!(project.template_names().is_empty());
}
