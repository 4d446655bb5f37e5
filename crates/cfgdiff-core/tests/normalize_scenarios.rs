//! Integration tests for whole-diff normalization.

use cfgdiff_core::{normalize_diff, Marker, NoiseFilter, NormalizeConfig};

const PREAMBLE: &str = "diff --git a/core-sw1 b/core-sw1\n\
                        index 3f2a9c1..8b7d0e4 100644\n\
                        --- a/core-sw1\n\
                        +++ b/core-sw1\n\
                        @@ -120,9 +120,9 @@ interface Port-channel10\n";

fn noisy_config() -> NormalizeConfig {
    NormalizeConfig::default().with_noise(
        NoiseFilter::new([
            r"^[-+ ]?! Last configuration change",
            r"^[-+ ]?ntp clock-period",
        ])
        .unwrap(),
    )
}

fn diff(body: &[&str]) -> String {
    format!("{PREAMBLE}{}\n", body.join("\n"))
}

#[test]
fn test_vlan_rewrite_end_to_end() {
    let input = diff(&[
        "- switchport trunk allowed vlan 5,6,7",
        "+ switchport trunk allowed vlan 6,7,8",
    ]);
    let out = normalize_diff(&input, &NormalizeConfig::default())
        .unwrap()
        .expect("vlan change is reported");

    assert!(out.has_real_changes);
    let markers: Vec<Marker> = out.lines.iter().map(|l| l.marker).collect();
    assert_eq!(markers, vec![Marker::None, Marker::Removed, Marker::Added]);
    assert_eq!(
        out.rendered(),
        vec![
            "  switchport trunk allowed vlan 6-7",
            "- switchport trunk allowed vlan add 5",
            "+ switchport trunk allowed vlan add 8",
        ]
    );
}

#[test]
fn test_reconciliation_groups() {
    let input = diff(&[
        " interface GigabitEthernet1/0/48",
        "- switchport trunk allowed vlan 10,11,12,20",
        "+ switchport trunk allowed vlan 11,12,20,21",
        " switchport mode trunk",
    ]);
    let out = normalize_diff(&input, &NormalizeConfig::default())
        .unwrap()
        .unwrap();
    assert_eq!(
        out.rendered(),
        vec![
            " interface GigabitEthernet1/0/48",
            "  switchport trunk allowed vlan 11-12,20",
            "- switchport trunk allowed vlan add 10",
            "+ switchport trunk allowed vlan add 21",
            " switchport mode trunk",
        ]
    );
}

#[test]
fn test_noise_only_diff_is_not_reported() {
    let input = diff(&[
        "-! Last configuration change at 02:00:01 UTC Mon Jan 5 2026",
        "+! Last configuration change at 02:00:03 UTC Tue Jan 6 2026",
        "-ntp clock-period 36028797",
        "+ntp clock-period 36028801",
    ]);
    assert!(normalize_diff(&input, &noisy_config()).unwrap().is_none());
}

#[test]
fn test_noise_never_reaches_output() {
    let input = diff(&[
        "-! Last configuration change at 02:00:01 UTC Mon Jan 5 2026",
        "+! Last configuration change at 02:00:03 UTC Tue Jan 6 2026",
        " hostname core-sw1",
        "-logging host 10.0.0.5",
        "+logging host 10.0.0.6",
    ]);
    let out = normalize_diff(&input, &noisy_config()).unwrap().unwrap();
    assert_eq!(
        out.rendered(),
        vec![
            " hostname core-sw1",
            "-logging host 10.0.0.5",
            "+logging host 10.0.0.6",
        ]
    );
}

#[test]
fn test_unchanged_vlan_block_passes_through_verbatim() {
    let input = diff(&[
        " switchport trunk allowed vlan 1-10,20",
        " switchport trunk allowed vlan add 30-40",
        "-description old uplink",
        "+description new uplink",
    ]);
    let out = normalize_diff(&input, &NormalizeConfig::default())
        .unwrap()
        .unwrap();
    assert_eq!(
        out.rendered(),
        vec![
            " switchport trunk allowed vlan 1-10,20",
            " switchport trunk allowed vlan add 30-40",
            "-description old uplink",
            "+description new uplink",
        ]
    );
}

#[test]
fn test_phrasing_has_exactly_one_bare_line() {
    let before: Vec<String> = (1..=30).map(|i| (i * 3).to_string()).collect();
    let after: Vec<String> = (2..=40).map(|i| (i * 3).to_string()).collect();
    let del = format!("- switchport trunk allowed vlan {}", before.join(","));
    let add = format!("+ switchport trunk allowed vlan {}", after.join(","));
    let input = diff(&[&del, &add]);

    let out = normalize_diff(&input, &NormalizeConfig::default())
        .unwrap()
        .unwrap();
    let rendered = out.rendered();
    let bare = rendered
        .iter()
        .filter(|l| l.contains("allowed vlan ") && !l.contains("allowed vlan add "))
        .count();
    assert_eq!(bare, 1);
    assert!(!rendered[0].contains("vlan add"));
    assert!(rendered.iter().skip(1).all(|l| l.contains("vlan add")));
}

#[test]
fn test_wrapping_respects_configured_limit() {
    let ids: Vec<String> = (0..7).map(|i| (i * 10 + 100).to_string()).collect();
    let input = diff(&[&format!("+ switchport trunk allowed vlan {}", ids.join(","))]);
    let config = NormalizeConfig::default().with_max_vlans_per_line(3);

    let out = normalize_diff(&input, &config).unwrap().unwrap();
    assert_eq!(
        out.rendered(),
        vec![
            "+ switchport trunk allowed vlan 100,110,120",
            "+ switchport trunk allowed vlan add 130,140,150",
            "+ switchport trunk allowed vlan add 160",
        ]
    );
}

#[test]
fn test_malformed_vlan_list_is_an_error() {
    let input = diff(&["+ switchport trunk allowed vlan 10,,20"]);
    assert!(normalize_diff(&input, &NormalizeConfig::default()).is_err());
}

#[test]
fn test_noise_vlan_line_inside_run_is_ignored() {
    let config = NormalizeConfig::default()
        .with_noise(NoiseFilter::new([r"allowed vlan add 999$"]).unwrap());
    let input = diff(&[
        " switchport trunk allowed vlan 1-10",
        "+ switchport trunk allowed vlan add 999",
    ]);
    assert!(normalize_diff(&input, &config).unwrap().is_none());
}

#[test]
fn test_noise_vlan_line_does_not_erase_context_membership() {
    let config = NormalizeConfig::default()
        .with_noise(NoiseFilter::new([r"allowed vlan add 999$"]).unwrap());
    let input = diff(&[
        "  switchport trunk allowed vlan 1-10",
        "+ switchport trunk allowed vlan add 999",
        "- switchport trunk allowed vlan add 20",
        "+ switchport trunk allowed vlan add 21",
    ]);
    let out = normalize_diff(&input, &config).unwrap().unwrap();
    assert_eq!(
        out.rendered(),
        vec![
            "  switchport trunk allowed vlan 1-10",
            "- switchport trunk allowed vlan add 20",
            "+ switchport trunk allowed vlan add 21",
        ]
    );
}

#[test]
fn test_huge_vlan_span_fails_fast() {
    let input = diff(&["+ switchport trunk allowed vlan 1-4294967295"]);
    assert!(normalize_diff(&input, &NormalizeConfig::default()).is_err());
}
