use invitehub_db::object_id::TeamId;

use crate::common::run_app_test_with_config;

#[tokio::test]
async fn join_attempts_are_limited_per_ip() {
    run_app_test_with_config(
        |config| config.join_rate_limit = 3,
        |app| async move {
            let team_id = app.add_team("popular", 50, true).await?;

            for i in 0..3 {
                let email = format!("user{i}@example.com");
                let response = app.join(team_id, Some(&email)).await?;
                assert_eq!(response.status().as_u16(), 200);
            }

            // The fourth attempt fails before the team is even looked at,
            // so an unknown team id gets the same 429.
            let response = app.join(TeamId::new(), None).await?;
            assert_eq!(response.status().as_u16(), 429);
            let body: serde_json::Value = response.json().await?;
            assert_eq!(
                body["error"]["message"],
                "Too many join attempts. Please try again later."
            );

            assert_eq!(app.member_count(team_id).await?, 3);
            Ok(())
        },
    )
    .await
}

#[tokio::test]
async fn limit_resets_after_the_window() {
    run_app_test_with_config(
        |config| {
            config.join_rate_limit = 1;
            config.join_rate_window_seconds = 1;
        },
        |app| async move {
            let team_id = app.add_team("quiet", 50, true).await?;

            let response = app.join(team_id, Some("a@example.com")).await?;
            assert_eq!(response.status().as_u16(), 200);
            let response = app.join(team_id, Some("b@example.com")).await?;
            assert_eq!(response.status().as_u16(), 429);

            tokio::time::sleep(std::time::Duration::from_millis(1200)).await;

            let response = app.join(team_id, Some("b@example.com")).await?;
            assert_eq!(response.status().as_u16(), 200);
            Ok(())
        },
    )
    .await
}
