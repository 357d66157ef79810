//! Built-in provider presets used to seed an empty backend registry.

use crate::model_config::{ModelConfig, ModelRegistry};

/// A known provider: seed config (empty key) plus where to get a key.
#[derive(Debug, Clone, Copy)]
pub struct ProviderPreset {
    pub name: &'static str,
    pub model_id: &'static str,
    pub url: &'static str,
    pub api_keys_url: &'static str,
}

impl ProviderPreset {
    pub fn to_config(&self) -> ModelConfig {
        ModelConfig::new(self.name, self.model_id, self.url, "")
    }
}

pub const PRESETS: &[ProviderPreset] = &[
    ProviderPreset {
        name: "ChatGLM",
        model_id: "glm-4.5",
        url: "https://open.bigmodel.cn/api/paas/v4",
        api_keys_url: "https://open.bigmodel.cn/usercenter/proj-mgmt/apikeys",
    },
    ProviderPreset {
        name: "Qwen",
        model_id: "qwen3-235b-a22b-instruct-2507",
        url: "https://dashscope.aliyuncs.com/compatible-mode/v1",
        api_keys_url: "https://bailian.console.aliyun.com/?tab=model#/api-key",
    },
    ProviderPreset {
        name: "Moonshot",
        model_id: "kimi-k2-0711-preview",
        url: "https://api.moonshot.cn/v1",
        api_keys_url: "https://platform.moonshot.cn/console/api-keys",
    },
    ProviderPreset {
        name: "DeepSeek",
        model_id: "deepseek-chat",
        url: "https://api.deepseek.com",
        api_keys_url: "https://platform.deepseek.com/api_keys",
    },
    ProviderPreset {
        name: "SiliconFlow",
        model_id: "Qwen/Qwen3-Coder-480B-A35B-Instruct",
        url: "https://api.siliconflow.cn/v1",
        api_keys_url: "https://cloud.siliconflow.cn/me/account/ak",
    },
];

pub fn find(name: &str) -> Option<&'static ProviderPreset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Seed configs for every preset, in display order.
pub fn seed_configs() -> Vec<ModelConfig> {
    PRESETS.iter().map(ProviderPreset::to_config).collect()
}

/// Local registry before anything has been fetched.
pub fn seed_registry() -> ModelRegistry {
    ModelRegistry::new(seed_configs())
}
