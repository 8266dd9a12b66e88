use std::path::{Path, PathBuf};

use f5xc_tfgen_core::{generate, Error, GeneratorConfig, Result, SkipReason};
use tempfile::TempDir;

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/specs")
}

fn config_into(out: &TempDir) -> GeneratorConfig {
    let mut config = GeneratorConfig::new(fixtures());
    config.output_dir = out.path().join("internal/provider");
    config.client_dir = out.path().join("internal/client");
    config
}

#[tokio::test]
async fn test_generate_fixture_batch() -> Result<()> {
    let out = tempfile::tempdir()?;
    let config = config_into(&out);

    let summary = generate(&config).await?;

    assert_eq!(summary.generated, vec!["http_loadbalancer", "origin_pool"]);
    assert_eq!(summary.skipped_for(SkipReason::Unsupported), 1);
    assert_eq!(summary.skipped_for(SkipReason::NoCreateSchema), 1);
    assert_eq!(summary.skipped_for(SkipReason::ParseError), 1);
    assert!(summary.failed.is_empty());
    assert_eq!(summary.fallback_refs, 1);
    assert!(summary
        .unresolved_refs
        .contains("#/components/schemas/policyLoadBalancerMissingHashPolicy"));
    assert_eq!(summary.collisions, 0);
    assert_eq!(
        summary.to_string(),
        "2 generated, 3 skipped, 0 failed (unsupported: 1, no-create-schema: 1, parse-error: 1); \
         1 reference fallbacks to string (1 distinct)"
    );

    let provider = out.path().join("internal/provider");
    let client = out.path().join("internal/client");
    for name in ["http_loadbalancer", "origin_pool"] {
        assert!(provider.join(format!("{name}_resource.go")).is_file());
        assert!(provider.join(format!("{name}_data_source.go")).is_file());
        assert!(client.join(format!("{name}_types.go")).is_file());
    }
    assert_eq!(summary.files.len(), 6);

    let resource = tokio::fs::read_to_string(provider.join("http_loadbalancer_resource.go")).await?;
    assert!(resource.contains("type HTTPLoadBalancerResource struct"));
    assert!(resource.contains("\"/api/config/namespaces/%s/http_loadbalancers\""));
    // vendor markers and trailing example clauses are stripped
    assert!(resource.contains(
        "A list of Domains (host/authority header) that will be matched to load balancer."
    ));
    assert!(!resource.contains("x-displayName"));
    assert!(!resource.contains("Required: YES"));
    // one OneOf annotation per group, on the alphabetically first member
    assert_eq!(resource.matches("[OneOf: http, https, https_auto_cert]").count(), 1);
    assert_eq!(resource.matches("[OneOf: app_firewall, disable_waf]").count(), 1);
    assert!(resource.contains("Possible values are `TLS_AUTO`, `TLSv1_2`, `TLSv1_3`. Defaults to `TLS_AUTO`."));
    // a placeholder default adds no hint
    assert!(resource.contains("MarkdownDescription: \"Idle timeout in milliseconds\","));

    let types = tokio::fs::read_to_string(client.join("origin_pool_types.go")).await?;
    assert!(types.contains("type OriginPoolSpec struct"));
    assert!(types.contains("Port int64 `json:\"port,omitempty\"`"));
    Ok(())
}

#[tokio::test]
async fn test_generation_is_deterministic() -> Result<()> {
    let first = tempfile::tempdir()?;
    let second = tempfile::tempdir()?;
    let a = generate(&config_into(&first)).await?;
    let b = generate(&config_into(&second)).await?;

    assert_eq!(a.files.len(), b.files.len());
    for (left, right) in a.files.iter().zip(&b.files) {
        assert_eq!(left.file_name(), right.file_name());
        let left = tokio::fs::read(left).await?;
        let right = tokio::fs::read(right).await?;
        assert_eq!(left, right);
    }
    Ok(())
}

#[tokio::test]
async fn test_dry_run_writes_nothing() -> Result<()> {
    let out = tempfile::tempdir()?;
    let mut config = config_into(&out);
    config.dry_run = true;

    let summary = generate(&config).await?;
    assert_eq!(summary.generated.len(), 2);
    assert_eq!(summary.files.len(), 6);
    assert!(summary.files.iter().all(|path| !path.exists()));
    assert!(!out.path().join("internal").exists());
    assert!(summary.to_string().ends_with("dry run, nothing written"));
    Ok(())
}

#[tokio::test]
async fn test_strict_refs_fail_only_the_affected_resource() -> Result<()> {
    let out = tempfile::tempdir()?;
    let mut config = config_into(&out);
    config.strict_refs = true;

    let summary = generate(&config).await?;
    assert_eq!(summary.generated, vec!["origin_pool"]);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].resource, "http_loadbalancer");
    assert!(summary.failed[0].error.contains("policyLoadBalancerMissingHashPolicy"));
    assert_eq!(summary.fallback_refs, 0);
    Ok(())
}

#[tokio::test]
async fn test_include_and_exclude_filters() -> Result<()> {
    let out = tempfile::tempdir()?;
    let mut config = config_into(&out);
    config.exclude_resources = vec!["http_loadbalancer".into()];

    let summary = generate(&config).await?;
    assert_eq!(summary.generated, vec!["origin_pool"]);
    assert_eq!(summary.skipped_for(SkipReason::Unsupported), 2);

    config.exclude_resources.clear();
    config.include_resources = vec!["http_loadbalancer".into()];
    let summary = generate(&config).await?;
    assert_eq!(summary.generated, vec!["http_loadbalancer"]);
    Ok(())
}

#[tokio::test]
async fn test_undecodable_files_are_parse_error_skips() -> Result<()> {
    let specs = tempfile::tempdir()?;
    let origin_pool = "docs-cloud-f5-com.0081.public.ves.io.schema.views.origin_pool.ves-swagger.json";
    tokio::fs::copy(fixtures().join(origin_pool), specs.path().join(origin_pool)).await?;
    tokio::fs::write(
        specs
            .path()
            .join("docs-cloud-f5-com.0082.public.ves.io.schema.views.latin1.ves-swagger.json"),
        b"{\"openapi\": \"3.0.3\", \"info\": {\"title\": \"Caf\xe9\"}}",
    )
    .await?;
    tokio::fs::write(
        specs
            .path()
            .join("docs-cloud-f5-com.0083.public.ves.io.schema.views.required_yes.ves-swagger.json"),
        r#"{"openapi": "3.0.3", "components": {"schemas": {
            "viewsrequired_yesCreateSpecType": {"type": "object", "required": "yes"}
        }}}"#,
    )
    .await?;
    tokio::fs::write(
        specs
            .path()
            .join("docs-cloud-f5-com.0084.public.ves.io.schema.views.nullable.ves-swagger.json"),
        r#"{"openapi": "3.0.3", "components": {"schemas": {
            "viewsnullableCreateSpecType": {"type": ["string", "null"]}
        }}}"#,
    )
    .await?;

    let out = tempfile::tempdir()?;
    let mut config = config_into(&out);
    config.spec_dir = specs.path().to_path_buf();

    let summary = generate(&config).await?;
    assert_eq!(summary.generated, vec!["origin_pool"]);
    assert_eq!(summary.skipped_for(SkipReason::ParseError), 3);
    assert!(summary.failed.is_empty());
    assert!(out.path().join("internal/provider/origin_pool_resource.go").is_file());
    Ok(())
}

#[tokio::test]
async fn test_empty_spec_dir_is_fatal() -> Result<()> {
    let specs = tempfile::tempdir()?;
    let out = tempfile::tempdir()?;
    let mut config = config_into(&out);
    config.spec_dir = specs.path().to_path_buf();

    let err = generate(&config).await.unwrap_err();
    assert!(matches!(err, Error::NoSpecFiles { .. }));
    assert!(err.is_fatal());
    Ok(())
}

#[tokio::test]
async fn test_custom_templates_and_post_generate_hook() -> Result<()> {
    let templates = tempfile::tempdir()?;
    tokio::fs::write(
        templates.path().join("manifest.yaml"),
        r#"
name: listing
files:
  - source: listing.tera
    destination: "{{ name }}.txt"
    artifact: resource
hooks:
  post_generate: "ls > ../hook-output.txt"
"#,
    )
    .await?;
    tokio::fs::write(
        templates.path().join("listing.tera"),
        "{% for attr in attributes %}{{ attr.name }}\n{% endfor %}",
    )
    .await?;

    let out = tempfile::tempdir()?;
    let mut config = config_into(&out);
    config.template_dir = Some(templates.path().to_path_buf());

    let summary = generate(&config).await?;
    assert_eq!(summary.files.len(), 2);

    let listing =
        tokio::fs::read_to_string(out.path().join("internal/provider/origin_pool.txt")).await?;
    let names: Vec<_> = listing.lines().collect();
    assert_eq!(
        names,
        vec![
            "name",
            "namespace",
            "port",
            "annotations",
            "description",
            "disable",
            "labels",
            "loadbalancer_algorithm",
            "origin_servers",
            "id"
        ]
    );

    let hook = tokio::fs::read_to_string(out.path().join("internal/hook-output.txt")).await?;
    assert!(hook.contains("http_loadbalancer.txt"));
    assert!(hook.contains("origin_pool.txt"));
    Ok(())
}
