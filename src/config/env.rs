use crate::domain::model::{Port, PortSource, ResolvedPort, PORT_VAR};
use crate::domain::ports::Environment;
use crate::utils::error::Result;
use std::collections::HashMap;

/// 讀取真正的行程環境
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// 解析 PORT：僅在未設定或為空字串時使用 `default`；其他值原樣驗證
pub fn resolve_port<E: Environment + ?Sized>(env: &E, default: Port) -> Result<ResolvedPort> {
    match env.var(PORT_VAR) {
        Some(raw) if !raw.is_empty() => {
            let port = raw.parse::<Port>()?;
            tracing::debug!("🔧 {} from environment: {}", PORT_VAR, port);
            Ok(ResolvedPort {
                port,
                source: PortSource::Environment,
            })
        }
        _ => {
            tracing::debug!("🔧 {} not set, defaulting to {}", PORT_VAR, default);
            Ok(ResolvedPort {
                port: default,
                source: PortSource::Default,
            })
        }
    }
}
