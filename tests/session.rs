mod common;

use browser_readiness::{
    BrowserError, BrowserSession, ClickOptions, ConnectionState, ReconnectPolicy, Timings, TypeOptions, WaitConditions,
};
use common::{MockConnector, Recorded, bbox};

fn session(connector: std::sync::Arc<MockConnector>) -> BrowserSession {
    BrowserSession::with_config(connector, Timings::default(), ReconnectPolicy::new(3, 1000))
}

fn login_page() -> std::sync::Arc<MockConnector> {
    MockConnector::with_setup(|driver| {
        driver.set_url("https://app.test/login");
        driver.set_page_text("Sign in to continue");
        driver.add_element("#user", bbox(100.0, 100.0, 200.0, 30.0));
        driver.add_element("#login", bbox(100.0, 150.0, 80.0, 30.0));
    })
}

#[tokio::test(start_paused = true)]
async fn test_login_flow() {
    let connector = login_page();
    let session = session(connector.clone());
    assert_eq!(session.state(), ConnectionState::Disconnected);

    let loaded = session.navigate("app.test/login").await.unwrap();
    assert_eq!(loaded, "https://app.test/login");

    let ready = session.wait_for_ready("#user", None).await.unwrap();
    assert!(ready.ready);

    session.type_text("#user", "ada", &TypeOptions::new()).await.unwrap();
    session.click("#login", &ClickOptions::new()).await.unwrap();

    let outcome = session
        .wait_for(&WaitConditions::new().text("sign in").url("login$"))
        .await
        .unwrap();
    assert!(outcome.success);

    let driver = connector.last_driver().unwrap();
    let recorded = driver.recorded();
    assert_eq!(recorded.first(), Some(&Recorded::Focus("#user".to_string())));
    assert_eq!(recorded.last(), Some(&Recorded::PointerRelease(140.0, 165.0)));
    assert_eq!(connector.calls(), 1);
    assert_eq!(session.state(), ConnectionState::Connected);
}

#[tokio::test(start_paused = true)]
async fn test_operations_reconnect_after_channel_loss() {
    let connector = login_page();
    let session = session(connector.clone());

    let state = session.check_state("#login").await.unwrap();
    assert!(state.is_ready());

    connector.last_driver().unwrap().trigger_disconnect();
    assert_eq!(session.state(), ConnectionState::Disconnected);

    session.click("#login", &ClickOptions::new()).await.unwrap();
    assert_eq!(connector.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_unreachable_browser_surfaces_reconnect_error() {
    let session = session(MockConnector::always_failing());

    let err = session.click("#login", &ClickOptions::new()).await.unwrap_err();

    assert!(err.is_connection_error());
    assert_eq!(err.report().code, "RECONNECT_EXHAUSTED");
    assert_eq!(session.state(), ConnectionState::Failed);
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_then_reuse() {
    let connector = login_page();
    let session = session(connector.clone());

    session.ensure_connected().await.unwrap();
    session.disconnect().await.unwrap();
    assert_eq!(session.state(), ConnectionState::Disconnected);

    let outcome = session.wait_for(&WaitConditions::new().element("#user")).await.unwrap();
    assert!(outcome.success);
    assert_eq!(connector.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_click_surfaces_lost_connection_instead_of_not_ready() {
    let connector = MockConnector::with_setup(|driver| {
        driver.add_element_with("#pay", vec![Some(bbox(0.0, 0.0, 80.0, 30.0))], true, false);
    });
    let session = session(connector.clone());
    session.ensure_connected().await.unwrap();

    let driver = connector.last_driver().unwrap();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        driver.lose_connection();
    });

    let err = session.click("#pay", &ClickOptions::new().timeout_ms(5000)).await.unwrap_err();

    assert!(matches!(err, BrowserError::ConnectionLost(_)));
    assert!(err.is_connection_error());
    assert_eq!(session.state(), ConnectionState::Disconnected);
}
