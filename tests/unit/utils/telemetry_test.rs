// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

#[cfg(test)]
mod tests {
    use lunchrs::utils::telemetry;

    #[test]
    fn test_telemetry_initialization() {
        telemetry::init_telemetry();
        // 重复初始化不应panic
        telemetry::init_telemetry();

        tracing::debug!("This is a debug message");
        tracing::info!(
            restaurant_id = "pagoden",
            task = "html",
            "Menu extraction started"
        );

        let error_result: Result<(), &str> = Err("Test error");
        if let Err(e) = error_result {
            tracing::error!(error = e, "Operation failed");
        }
    }
}
