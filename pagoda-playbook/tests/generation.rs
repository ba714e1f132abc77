//! End-to-end generation tests against real template trees on disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;
use serde_json::json;

use pagoda_core::{ComponentDescriptor, DeploymentModel};
use pagoda_playbook::{
    prepare_playbooks, GenerateOptions, PlaybookError, PlaybookLayout, WriteResult, LAYOUT_FILE,
};

const HOSTS_TEMPLATE: &str = "\
[web]
{% for h in web.hosts.master %}{{ h.ip }}{% if notLast(index=loop.index0, collection=web.hosts.master) %},{% endif %}{% endfor %}
";

const VARS_TEMPLATE: &str = "\
cluster_id: {{ web.inherent.cluster_id }}
version: {{ web.version }}
";

fn web_model() -> DeploymentModel {
    let mut model = DeploymentModel::new();
    model.insert(
        "web",
        ComponentDescriptor::new("1.0").with_cluster_id("c1").with_role(
            "master",
            vec![
                json!({"id": "h1", "hostname": "node-1", "ip": "10.0.0.1"}),
                json!({"id": "h2", "hostname": "node-2", "ip": "10.0.0.2"}),
                json!({"id": "h3", "hostname": "node-3", "ip": "10.0.0.3"}),
            ],
        ),
    );
    model
}

fn yat(root: &TempDir) -> assert_fs::fixture::ChildPath {
    root.child("web-playbook").child("1.0").child("yat")
}

fn cluster_dir(root: &Path) -> PathBuf {
    root.join("web-playbook").join("1.0").join("clusters").join("c1")
}

/// Every file under `dir`, relative path → bytes.
fn snapshot(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    fn walk(base: &Path, dir: &Path, out: &mut BTreeMap<PathBuf, Vec<u8>>) {
        for entry in fs::read_dir(dir).expect("read_dir") {
            let path = entry.expect("entry").path();
            if path.is_dir() {
                walk(base, &path, out);
            } else {
                let rel = path.strip_prefix(base).expect("prefix").to_path_buf();
                out.insert(rel, fs::read(&path).expect("read"));
            }
        }
    }
    let mut out = BTreeMap::new();
    walk(dir, dir, &mut out);
    out
}

// ---------------------------------------------------------------------------
// 1. End-to-end scenario
// ---------------------------------------------------------------------------

#[test]
fn web_component_renders_hosts_and_group_vars() {
    let root = TempDir::new().expect("root");
    yat(&root).child("hosts.tera").write_str(HOSTS_TEMPLATE).expect("hosts");
    yat(&root).child("vars.tera").write_str(VARS_TEMPLATE).expect("vars");

    let reports =
        prepare_playbooks(root.path(), &web_model(), &GenerateOptions::default()).expect("run");
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].writes.len(), 2);
    assert!(reports[0]
        .writes
        .iter()
        .all(|w| matches!(w, WriteResult::Written { .. })));

    let out = cluster_dir(root.path());
    assert_eq!(
        fs::read_to_string(out.join("hosts")).expect("hosts"),
        "[web]\n10.0.0.1,10.0.0.2,10.0.0.3\n"
    );
    assert_eq!(
        fs::read_to_string(out.join("group_vars").join("vars")).expect("vars"),
        "cluster_id: c1\nversion: 1.0\n"
    );

    let files: Vec<_> = snapshot(&out).into_keys().collect();
    assert_eq!(
        files,
        vec![PathBuf::from("group_vars").join("vars"), PathBuf::from("hosts")],
        "no other files may be created"
    );
}

// ---------------------------------------------------------------------------
// 2. Idempotence
// ---------------------------------------------------------------------------

#[test]
fn second_run_produces_identical_tree() {
    let root = TempDir::new().expect("root");
    yat(&root).child("hosts.tera").write_str(HOSTS_TEMPLATE).expect("hosts");
    yat(&root).child("vars.tera").write_str(VARS_TEMPLATE).expect("vars");
    yat(&root).child("ansible.cfg").write_str("[defaults]\n").expect("cfg");

    let model = web_model();
    prepare_playbooks(root.path(), &model, &GenerateOptions::default()).expect("first");
    let first = snapshot(&cluster_dir(root.path()));
    prepare_playbooks(root.path(), &model, &GenerateOptions::default()).expect("second");
    let second = snapshot(&cluster_dir(root.path()));

    assert_eq!(first, second);
}

#[test]
fn rerun_overwrites_manual_edits() {
    let root = TempDir::new().expect("root");
    yat(&root).child("hosts.tera").write_str(HOSTS_TEMPLATE).expect("hosts");

    let model = web_model();
    prepare_playbooks(root.path(), &model, &GenerateOptions::default()).expect("first");
    let hosts = cluster_dir(root.path()).join("hosts");
    fs::write(&hosts, "tampered with a much longer line than before\n").expect("tamper");

    prepare_playbooks(root.path(), &model, &GenerateOptions::default()).expect("second");
    assert_eq!(
        fs::read_to_string(&hosts).expect("read"),
        "[web]\n10.0.0.1,10.0.0.2,10.0.0.3\n"
    );
}

// ---------------------------------------------------------------------------
// 3. Structural failures
// ---------------------------------------------------------------------------

#[test]
fn missing_hosts_template_writes_nothing() {
    let root = TempDir::new().expect("root");
    yat(&root).child("vars.tera").write_str(VARS_TEMPLATE).expect("vars");

    let err = prepare_playbooks(root.path(), &web_model(), &GenerateOptions::default())
        .unwrap_err();
    assert!(
        matches!(err.root_cause(), PlaybookError::MissingRequiredTemplate { .. }),
        "got: {err}"
    );
    root.child("web-playbook/1.0/clusters")
        .assert(predicate::path::missing());
}

#[test]
fn missing_version_directory_is_source_unavailable() {
    let root = TempDir::new().expect("root");
    root.child("web-playbook/0.9/yat/hosts.tera")
        .write_str("x")
        .expect("wrong version");

    let err = prepare_playbooks(root.path(), &web_model(), &GenerateOptions::default())
        .unwrap_err();
    assert!(
        matches!(err.root_cause(), PlaybookError::SourceUnavailable { .. }),
        "got: {err}"
    );
    let msg = err.to_string();
    assert!(msg.contains("web"), "component missing from: {msg}");
    assert!(msg.contains("1.0"), "version missing from: {msg}");
    assert!(msg.contains("c1"), "cluster missing from: {msg}");
}

// ---------------------------------------------------------------------------
// 4. Strict binding
// ---------------------------------------------------------------------------

#[test]
fn missing_key_fails_without_touching_destination() {
    let root = TempDir::new().expect("root");
    yat(&root).child("hosts.tera").write_str(HOSTS_TEMPLATE).expect("hosts");
    yat(&root).child("vars.tera").write_str(VARS_TEMPLATE).expect("vars");

    let model = web_model();
    prepare_playbooks(root.path(), &model, &GenerateOptions::default()).expect("good run");
    let vars = cluster_dir(root.path()).join("group_vars").join("vars");
    let good = fs::read(&vars).expect("read");

    yat(&root)
        .child("vars.tera")
        .write_str("port: {{ web.inherent.http_port }}\n")
        .expect("break template");

    let err = prepare_playbooks(root.path(), &model, &GenerateOptions::default()).unwrap_err();
    match err.root_cause() {
        PlaybookError::TemplateExecutionError { path, source } => {
            assert!(path.ends_with("vars.tera"));
            assert!(source.to_string().contains("http_port"), "{source}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fs::read(&vars).expect("read"), good, "previous output must survive");
}

#[test]
fn undefined_condition_fails_without_writing() {
    let root = TempDir::new().expect("root");
    yat(&root)
        .child("hosts.tera")
        .write_str("{% if web.inherent.no_such_key %}on{% else %}off{% endif %}\n")
        .expect("hosts");

    let err = prepare_playbooks(root.path(), &web_model(), &GenerateOptions::default())
        .unwrap_err();
    match err.root_cause() {
        PlaybookError::TemplateExecutionError { path, source } => {
            assert!(path.ends_with("hosts.tera"));
            assert!(source.to_string().contains("no_such_key"), "{source}");
        }
        other => panic!("unexpected error: {other}"),
    }
    root.child("web-playbook/1.0/clusters/c1/hosts")
        .assert(predicate::path::missing());
}

#[test]
fn missing_key_on_first_run_leaves_no_file() {
    let root = TempDir::new().expect("root");
    yat(&root)
        .child("hosts.tera")
        .write_str("{{ web.inherent.nope }}")
        .expect("hosts");

    prepare_playbooks(root.path(), &web_model(), &GenerateOptions::default()).unwrap_err();
    assert!(!cluster_dir(root.path()).join("hosts").exists());
}

// ---------------------------------------------------------------------------
// 5. Static files and group_vars policy
// ---------------------------------------------------------------------------

#[test]
fn static_files_are_copied_verbatim() {
    let root = TempDir::new().expect("root");
    yat(&root).child("hosts.tera").write_str(HOSTS_TEMPLATE).expect("hosts");
    let raw = "[defaults]\nhost_key_checking = {{ not a template }}\r\n";
    yat(&root).child("ansible.cfg").write_str(raw).expect("cfg");
    let blob: Vec<u8> = (0u8..=255).collect();
    yat(&root).child("blob.bin").write_binary(&blob).expect("blob");

    prepare_playbooks(root.path(), &web_model(), &GenerateOptions::default()).expect("run");

    let out = cluster_dir(root.path());
    assert_eq!(fs::read(out.join("ansible.cfg")).expect("cfg"), raw.as_bytes());
    assert_eq!(fs::read(out.join("blob.bin")).expect("blob"), blob);
}

#[test]
fn crlf_in_model_values_is_written_unchanged() {
    let root = TempDir::new().expect("root");
    yat(&root)
        .child("hosts.tera")
        .write_str("{{ web.inherent.cert }}")
        .expect("hosts");
    let mut model = DeploymentModel::new();
    model.insert(
        "web",
        ComponentDescriptor::new("1.0")
            .with_cluster_id("c1")
            .with_inherent("cert", "a\r\nb"),
    );

    prepare_playbooks(root.path(), &model, &GenerateOptions::default()).expect("run");
    assert_eq!(
        fs::read(cluster_dir(root.path()).join("hosts")).expect("hosts"),
        b"a\r\nb"
    );
}

#[test]
fn subdirectory_next_to_hosts_template_still_creates_group_vars() {
    let root = TempDir::new().expect("root");
    yat(&root).child("hosts.tera").write_str(HOSTS_TEMPLATE).expect("hosts");
    yat(&root).child("roles").create_dir_all().expect("roles");

    prepare_playbooks(root.path(), &web_model(), &GenerateOptions::default()).expect("run");

    root.child("web-playbook/1.0/clusters/c1/group_vars")
        .assert(predicate::path::is_dir());
    root.child("web-playbook/1.0/clusters/c1/roles")
        .assert(predicate::path::missing());
}

#[test]
#[cfg(unix)]
fn generated_files_are_0755() {
    use std::os::unix::fs::PermissionsExt;

    let root = TempDir::new().expect("root");
    yat(&root).child("hosts.tera").write_str(HOSTS_TEMPLATE).expect("hosts");
    yat(&root).child("ansible.cfg").write_str("[defaults]\n").expect("cfg");

    prepare_playbooks(root.path(), &web_model(), &GenerateOptions::default()).expect("run");

    for name in ["hosts", "ansible.cfg"] {
        let path = cluster_dir(root.path()).join(name);
        let mode = fs::metadata(&path).expect("metadata").permissions().mode() & 0o777;
        assert_eq!(mode, 0o755, "{name}: {mode:o}");
    }
}

#[test]
fn hosts_only_tree_has_no_group_vars() {
    let root = TempDir::new().expect("root");
    yat(&root).child("hosts.tera").write_str(HOSTS_TEMPLATE).expect("hosts");

    prepare_playbooks(root.path(), &web_model(), &GenerateOptions::default()).expect("run");

    root.child("web-playbook/1.0/clusters/c1/hosts")
        .assert(predicate::path::is_file());
    root.child("web-playbook/1.0/clusters/c1/group_vars")
        .assert(predicate::path::missing());
}

// ---------------------------------------------------------------------------
// 6. Multiple clusters and layout overrides
// ---------------------------------------------------------------------------

#[test]
fn components_scope_output_by_their_own_cluster() {
    let root = TempDir::new().expect("root");
    yat(&root).child("hosts.tera").write_str("web").expect("web hosts");
    root.child("db-playbook/2.0/yat/hosts.tera")
        .write_str("db {{ db.inherent.cluster_id }}")
        .expect("db hosts");

    let mut model = DeploymentModel::new();
    model.insert("web", ComponentDescriptor::new("1.0").with_cluster_id("c1"));
    model.insert("db", ComponentDescriptor::new("2.0").with_cluster_id("c2"));

    prepare_playbooks(root.path(), &model, &GenerateOptions::default()).expect("run");

    root.child("web-playbook/1.0/clusters/c1/hosts")
        .assert("web");
    root.child("db-playbook/2.0/clusters/c2/hosts")
        .assert("db c2");
}

#[test]
fn layout_file_switches_suffix_and_template_dir() {
    let root = TempDir::new().expect("root");
    root.child(LAYOUT_FILE)
        .write_str("template_dir: templates\ntemplate_suffix: .gotmpl\nhosts_template: hosts.gotmpl\n")
        .expect("layout");
    let templates = root.child("web-playbook/1.0/templates");
    templates
        .child("hosts.gotmpl")
        .write_str("{{ web.version }}")
        .expect("hosts");
    templates
        .child("all.yml.gotmpl")
        .write_str("id: {{ web.inherent.cluster_id }}")
        .expect("vars");
    templates
        .child("notes.tera")
        .write_str("{{ left alone }}")
        .expect("static");

    let layout = PlaybookLayout::load_at(root.path()).expect("layout");
    let options = GenerateOptions {
        layout,
        ..GenerateOptions::default()
    };
    prepare_playbooks(root.path(), &web_model(), &options).expect("run");

    root.child("web-playbook/1.0/clusters/c1/hosts").assert("1.0");
    root.child("web-playbook/1.0/clusters/c1/group_vars/all.yml")
        .assert("id: c1");
    root.child("web-playbook/1.0/clusters/c1/notes.tera")
        .assert("{{ left alone }}");
}
