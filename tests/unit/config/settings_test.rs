// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置设置测试模块
///
/// 确保在没有配置文件时也能使用内置默认值加载配置

#[cfg(test)]
mod tests {
    use lunchrs::config::settings::{Settings, MAX_LLM_TIMEOUT_SECS};

    #[test]
    fn test_config_loading_with_defaults() {
        let settings = Settings::new().expect("settings should load from defaults");

        assert!(!settings.llm.model.is_empty());
        assert!(!settings.llm.api_base_url.is_empty());
        assert!(settings.llm.effective_timeout_secs() <= MAX_LLM_TIMEOUT_SECS);
        assert!(!settings.storage.storage_type.is_empty());
        assert!(settings.fetch.timeout_secs > 0);
    }
}
