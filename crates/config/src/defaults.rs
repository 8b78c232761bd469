//! Built-in platform, architecture and stream definitions.

use crate::models::{PlatformConfig, StreamConfig};
use std::collections::BTreeMap;

const PRODUCT_NAME: &str = "com.ubuntu.juju:{{ series }}:{{ arch }}";
const VERSION_NAME: &str = "{{ version }}-{{ release }}-{{ arch }}";

pub(crate) fn architectures() -> BTreeMap<String, String> {
    [
        ("386", "i386"),
        ("amd64", "amd64"),
        ("arm", "armhf"),
        ("arm64", "arm64"),
        ("ppc64el", "ppc64el"),
        ("ppc64le", "ppc64el"),
        ("riscv64", "riscv64"),
        ("s390x", "s390x"),
    ]
    .into_iter()
    .map(|(raw, label)| (raw.to_string(), label.to_string()))
    .collect()
}

pub(crate) fn platforms() -> Vec<PlatformConfig> {
    vec![PlatformConfig::new("linux", "ubuntu", "ubuntu"), PlatformConfig::new("linux", "centos", "centos")]
}

fn stream(channel: &str, kind: &str) -> StreamConfig {
    StreamConfig {
        key: format!("{channel}-{kind}"),
        directory: channel.to_string(),
        content_id: format!("com.ubuntu.juju:{channel}:{kind}"),
        slug: format!("com.ubuntu.juju-{channel}-{kind}"),
        product_name: PRODUCT_NAME.to_string(),
        version_name: VERSION_NAME.to_string(),
    }
}

pub(crate) fn streams() -> Vec<StreamConfig> {
    vec![
        stream("released", "tools"),
        stream("proposed", "tools"),
        stream("proposed", "agents"),
        stream("released", "agents"),
    ]
}
