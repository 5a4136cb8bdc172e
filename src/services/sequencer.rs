//! Alert dispatch sequencing
//!
//! The sequencer drives the SOS workflow: a cancelable arming countdown,
//! location resolution, payload composition, channel dispatch and the final
//! call-confirmation handshake. Opening a messaging composer and a dialer
//! cannot safely happen in the same synchronous step on every platform, so
//! the sequence parks in `AwaitingConfirmationCall` until the user explicitly
//! confirms the call.
//!
//! Every failure along the way is degraded, never fatal: a missing location
//! becomes a placeholder, missing contacts skip straight to the confirmation
//! step, and a failed intent is surfaced as a notice. The machine always
//! terminates in a defined state.

use crate::domain::message::{
    compose_alert, format_timestamp, map_link, EMAIL_SUBJECT, LOCATION_UNAVAILABLE,
};
use crate::domain::types::{Contact, Support};
use crate::infra::{ContactStore, SettingsStore};
use crate::io::{ChannelDispatcher, LocationProvider, Notice, NoticeSender, PlatformProbe};
use chrono::Local;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Upper bound on a single location query; a stalled query degrades to the
/// placeholder instead of hanging the sequence
const LOCATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Sequencer state; exactly one instance exists per session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    /// Cancelable countdown, decremented once per second
    Arming { remaining: u32 },
    Dispatching,
    /// Dispatch finished; waiting for the user to confirm the emergency call
    AwaitingConfirmationCall,
}

/// The alert dispatch state machine
#[derive(Clone)]
pub struct AlertSequencer {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<SequencerState>,
    arming_task: Mutex<Option<JoinHandle<()>>>,
    settings: Arc<dyn SettingsStore>,
    contacts: Arc<dyn ContactStore>,
    location: Arc<dyn LocationProvider>,
    dispatcher: Arc<dyn ChannelDispatcher>,
    probe: Arc<dyn PlatformProbe>,
    notices: NoticeSender,
}

impl AlertSequencer {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        contacts: Arc<dyn ContactStore>,
        location: Arc<dyn LocationProvider>,
        dispatcher: Arc<dyn ChannelDispatcher>,
        probe: Arc<dyn PlatformProbe>,
        notices: NoticeSender,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(SequencerState::Idle),
                arming_task: Mutex::new(None),
                settings,
                contacts,
                location,
                dispatcher,
                probe,
                notices,
            }),
        }
    }

    pub fn state(&self) -> SequencerState {
        *self.inner.state.lock()
    }

    /// Start the SOS sequence. No-op unless the machine is `Idle`.
    ///
    /// Reads the freshest arming delay from settings: zero goes straight to
    /// dispatch, anything else starts the cancelable countdown.
    pub fn trigger(&self) {
        let delay = {
            let mut state = self.inner.state.lock();
            if *state != SequencerState::Idle {
                debug!(state = ?*state, "sos_trigger_ignored");
                return;
            }
            let delay = self.inner.settings.read().arming_delay_secs;
            *state = if delay == 0 {
                SequencerState::Dispatching
            } else {
                SequencerState::Arming { remaining: delay }
            };
            delay
        };

        if delay == 0 {
            info!("sos_dispatch_immediate");
            let inner = self.inner.clone();
            tokio::spawn(async move {
                inner.run_dispatch().await;
            });
        } else {
            info!(delay_secs = %delay, "sos_arming_started");
            self.inner.notices.send(Notice::info(
                "SOS arming",
                format!("SOS will trigger in {delay}s. Tap Cancel to stop."),
            ));
            let inner = self.inner.clone();
            let handle = tokio::spawn(async move {
                inner.run_arming().await;
            });
            *self.inner.arming_task.lock() = Some(handle);
        }
    }

    /// Cancel the pending countdown. Only meaningful while `Arming`;
    /// tolerated as a no-op in every other state.
    pub fn cancel(&self) {
        let mut state = self.inner.state.lock();
        if !matches!(*state, SequencerState::Arming { .. }) {
            debug!(state = ?*state, "sos_cancel_ignored");
            return;
        }
        if let Some(task) = self.inner.arming_task.lock().take() {
            task.abort();
        }
        *state = SequencerState::Idle;
        info!("sos_canceled");
        self.inner.notices.send(Notice::info("SOS canceled", "You canceled the SOS sequence."));
    }

    /// Open the dialer with the resolved emergency number and end the
    /// handshake. The dialer outcome is unobservable, so the transition to
    /// `Idle` happens whether or not the intent succeeded.
    pub async fn confirm_call(&self) {
        let number = self.inner.settings.read().emergency_number();
        match self.inner.dispatcher.open_dialer(&number).await {
            Ok(()) => {
                info!(number = %number, "sos_dialer_opened");
                self.inner
                    .notices
                    .send(Notice::info("Dialer opened", format!("Proceeding to call {number}.")));
            }
            Err(e) => {
                warn!(error = %e, "sos_dialer_failed");
                self.inner
                    .notices
                    .send(Notice::warning("Call Failed", "Could not open the phone dialer."));
            }
        }
        let mut state = self.inner.state.lock();
        if *state == SequencerState::AwaitingConfirmationCall {
            *state = SequencerState::Idle;
        }
    }

    /// Direct call action; bypasses the arming state machine
    pub async fn quick_call(&self) {
        self.confirm_call().await;
    }

    /// Directly open the SMS composer with a freshly built payload
    pub async fn quick_sms(&self) {
        let payload = self.inner.build_payload().await;
        if payload.phones.is_empty() {
            self.inner.notices.send(Notice::info(
                "No phone numbers",
                "Please add emergency contact numbers.",
            ));
            return;
        }
        match self.inner.dispatcher.open_sms(&payload.phones, &payload.message).await {
            Ok(()) => {
                info!(recipients = %payload.phones, "quick_sms_opened");
                self.inner.notices.send(Notice::info(
                    "SMS composer opened",
                    "Review and send your message.",
                ));
            }
            Err(e) => {
                warn!(error = %e, "quick_sms_failed");
                self.inner
                    .notices
                    .send(Notice::warning("SMS Open Failed", "Could not open the SMS app."));
            }
        }
    }

    /// Directly open the email composer with a freshly built payload.
    /// The message is copied to the clipboard first as a fallback for mail
    /// clients that drop the body.
    pub async fn quick_email(&self) {
        let payload = self.inner.build_payload().await;
        if payload.emails.is_empty() {
            self.inner.notices.send(Notice::info("No emails", "Please add contact emails."));
            return;
        }
        match self.inner.dispatcher.write_clipboard(&payload.message).await {
            Ok(()) => self.inner.notices.send(Notice::info(
                "Opening email...",
                "Message copied to clipboard in case the body is empty.",
            )),
            Err(_) => self.inner.notices.send(Notice::info(
                "Opening email...",
                "If the body is empty, paste the message manually.",
            )),
        }
        if let Err(e) =
            self.inner.dispatcher.open_email(&payload.emails, EMAIL_SUBJECT, &payload.message).await
        {
            warn!(error = %e, "quick_email_failed");
            self.inner
                .notices
                .send(Notice::warning("Email Open Failed", "Could not open the email client."));
        }
    }

    /// Copy a fresh map link to the clipboard
    pub async fn quick_copy_location(&self) {
        let Some(url) = self.inner.resolve_map_link().await else {
            self.inner.notices.send(Notice::warning(
                "Location unavailable",
                "Enable location and try again.",
            ));
            return;
        };
        match self.inner.dispatcher.write_clipboard(&url).await {
            Ok(()) => {
                info!("quick_location_copied");
                self.inner.notices.send(Notice::info(
                    "Location copied",
                    "Current location link copied to clipboard.",
                ));
            }
            Err(e) => {
                warn!(error = %e, "quick_location_copy_failed");
                self.inner
                    .notices
                    .send(Notice::warning("Copy failed", "Could not copy the location link."));
            }
        }
    }
}

/// Freshly composed payload plus joined recipient lists
struct Payload {
    message: String,
    phones: String,
    emails: String,
}

impl Inner {
    async fn run_arming(self: Arc<Self>) {
        loop {
            tokio::time::sleep(Duration::from_secs(1)).await;
            let dispatch_now = {
                let mut state = self.state.lock();
                match &mut *state {
                    SequencerState::Arming { remaining } => {
                        *remaining -= 1;
                        debug!(remaining = %*remaining, "sos_arming_tick");
                        if *remaining == 0 {
                            *state = SequencerState::Dispatching;
                            true
                        } else {
                            false
                        }
                    }
                    // Canceled between ticks; nothing left to do.
                    _ => return,
                }
            };
            if dispatch_now {
                self.run_dispatch().await;
                return;
            }
        }
    }

    async fn run_dispatch(&self) {
        // Settings may have changed since the button was first shown.
        let settings = self.settings.read();
        let location_text =
            self.resolve_map_link().await.unwrap_or_else(|| LOCATION_UNAVAILABLE.to_string());
        let timestamp = format_timestamp(Local::now());
        let number = settings.emergency_number();
        let message = compose_alert(&location_text, &timestamp, &number, &settings.personal_details);

        let contacts = self.contacts.read();
        if contacts.is_empty() {
            warn!("sos_no_contacts");
            self.notices.send(Notice::warning(
                "No Emergency Contacts",
                "Please add emergency contacts in settings first.",
            ));
            // Degraded path: still allow the manual emergency call.
            self.finish_awaiting_call();
            return;
        }

        let phones = join_phones(&contacts, self.probe.os_family().sms_recipient_delimiter());
        if phones.is_empty() {
            self.notices.send(Notice::info(
                "No phone numbers",
                "No contact numbers available. You can still place the call.",
            ));
        } else {
            // SMS goes first: a later intent can suspend or replace the page
            // context before the composer has a chance to open.
            match self.dispatcher.open_sms(&phones, &message).await {
                Ok(()) => {
                    info!(recipients = %phones, "sos_sms_opened");
                    self.notices.send(Notice::info(
                        "SMS step opened",
                        format!("Send the message, then return and tap 'Call {number} Now'."),
                    ));
                }
                Err(e) => {
                    warn!(error = %e, "sos_sms_failed");
                    self.notices.send(Notice::warning(
                        "SMS Open Failed",
                        "Could not open the SMS app. You can still place the call.",
                    ));
                }
            }
        }

        let emails = join_emails(&contacts);
        if !emails.is_empty() {
            if let Err(e) = self.dispatcher.open_email(&emails, EMAIL_SUBJECT, &message).await {
                warn!(error = %e, "sos_email_failed");
                self.notices.send(Notice::warning(
                    "Email Open Failed",
                    "Could not open the email client.",
                ));
            }
        }

        self.finish_awaiting_call();
    }

    fn finish_awaiting_call(&self) {
        *self.state.lock() = SequencerState::AwaitingConfirmationCall;
        info!("sos_awaiting_call");
    }

    /// Resolve a map link, or `None` when the location is unobtainable.
    /// Never blocks the sequence beyond [`LOCATION_TIMEOUT`].
    async fn resolve_map_link(&self) -> Option<String> {
        if self.probe.geolocation() == Support::Unsupported {
            warn!("sos_geolocation_unsupported");
            return None;
        }
        match tokio::time::timeout(LOCATION_TIMEOUT, self.location.resolve()).await {
            Ok(Ok(point)) => Some(map_link(point)),
            Ok(Err(e)) => {
                warn!(error = %e, "sos_location_failed");
                self.notices.send(Notice::warning(
                    "Location Error",
                    "Cannot get your location. Please enable location services.",
                ));
                None
            }
            Err(_) => {
                warn!("sos_location_timeout");
                self.notices.send(Notice::warning(
                    "Location Error",
                    "Cannot get your location. Please enable location services.",
                ));
                None
            }
        }
    }

    async fn build_payload(&self) -> Payload {
        let settings = self.settings.read();
        let contacts = self.contacts.read();
        let location_text =
            self.resolve_map_link().await.unwrap_or_else(|| LOCATION_UNAVAILABLE.to_string());
        let timestamp = format_timestamp(Local::now());
        let number = settings.emergency_number();
        let message = compose_alert(&location_text, &timestamp, &number, &settings.personal_details);
        Payload {
            message,
            phones: join_phones(&contacts, self.probe.os_family().sms_recipient_delimiter()),
            emails: join_emails(&contacts),
        }
    }
}

fn join_phones(contacts: &[Contact], delimiter: char) -> String {
    contacts
        .iter()
        .filter_map(|c| c.phone.as_deref())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(&delimiter.to_string())
}

fn join_emails(contacts: &[Contact]) -> String {
    contacts
        .iter()
        .filter_map(|c| c.email.as_deref())
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{GeoPoint, OsFamily};
    use crate::infra::{AlertSettings, MemoryContactStore, MemorySettingsStore};
    use crate::io::channels::DispatchError;
    use crate::io::location::LocationError;
    use crate::io::{create_notice_channel, FixedLocation, StaticProbe};
    use async_trait::async_trait;
    use uuid::Uuid;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Sms { recipients: String, body: String },
        Dial(String),
        Email { recipients: String, subject: String, body: String },
        Clipboard(String),
    }

    #[derive(Default)]
    struct RecordingDispatcher {
        calls: Mutex<Vec<Call>>,
        fail_sms: bool,
        fail_dial: bool,
    }

    impl RecordingDispatcher {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl ChannelDispatcher for RecordingDispatcher {
        async fn open_sms(&self, recipients: &str, body: &str) -> Result<(), DispatchError> {
            if self.fail_sms {
                return Err(DispatchError("sms blocked".to_string()));
            }
            self.calls.lock().push(Call::Sms {
                recipients: recipients.to_string(),
                body: body.to_string(),
            });
            Ok(())
        }

        async fn open_dialer(&self, number: &str) -> Result<(), DispatchError> {
            if self.fail_dial {
                return Err(DispatchError("dial blocked".to_string()));
            }
            self.calls.lock().push(Call::Dial(number.to_string()));
            Ok(())
        }

        async fn open_email(
            &self,
            recipients: &str,
            subject: &str,
            body: &str,
        ) -> Result<(), DispatchError> {
            self.calls.lock().push(Call::Email {
                recipients: recipients.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });
            Ok(())
        }

        async fn write_clipboard(&self, text: &str) -> Result<(), DispatchError> {
            self.calls.lock().push(Call::Clipboard(text.to_string()));
            Ok(())
        }
    }

    struct FailingLocation;

    #[async_trait]
    impl LocationProvider for FailingLocation {
        async fn resolve(&self) -> Result<GeoPoint, LocationError> {
            Err(LocationError::Denied)
        }
    }

    fn contact(name: &str, phone: Option<&str>, email: Option<&str>) -> Contact {
        Contact {
            id: Uuid::now_v7(),
            name: name.to_string(),
            phone: phone.map(str::to_string),
            email: email.map(str::to_string),
            relationship: None,
        }
    }

    struct Harness {
        sequencer: AlertSequencer,
        dispatcher: Arc<RecordingDispatcher>,
        settings: Arc<MemorySettingsStore>,
    }

    fn harness(delay_secs: u32, contacts: Vec<Contact>) -> Harness {
        harness_with(delay_secs, contacts, OsFamily::Android, Arc::new(FixedLocation::new(1.5, 2.5)))
    }

    fn harness_with(
        delay_secs: u32,
        contacts: Vec<Contact>,
        os_family: OsFamily,
        location: Arc<dyn LocationProvider>,
    ) -> Harness {
        let mut alert_settings = AlertSettings::default();
        alert_settings.arming_delay_secs = delay_secs;
        let settings = Arc::new(MemorySettingsStore::new(alert_settings));
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let (notices, _notices_rx) = create_notice_channel();
        let sequencer = AlertSequencer::new(
            settings.clone(),
            Arc::new(MemoryContactStore::new(contacts)),
            location,
            dispatcher.clone(),
            Arc::new(StaticProbe::new(os_family)),
            notices,
        );
        Harness { sequencer, dispatcher, settings }
    }

    async fn wait_for_state(sequencer: &AlertSequencer, wanted: SequencerState) {
        for _ in 0..2000 {
            if sequencer.state() == wanted {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("sequencer never reached {:?} (now {:?})", wanted, sequencer.state());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_delay_skips_arming() {
        let h = harness(0, vec![contact("A", Some("+911234567890"), None)]);
        h.sequencer.trigger();
        // No intermediate Arming state is observable.
        assert_eq!(h.sequencer.state(), SequencerState::Dispatching);
        wait_for_state(&h.sequencer, SequencerState::AwaitingConfirmationCall).await;

        let calls = h.dispatcher.calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            Call::Sms { recipients, body } => {
                assert_eq!(recipients, "+911234567890");
                assert!(body.contains("https://maps.google.com/?q="));
            }
            other => panic!("expected SMS, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_arming_counts_down_then_dispatches() {
        let h = harness(5, vec![contact("A", Some("+911234567890"), None)]);
        h.sequencer.trigger();
        assert_eq!(h.sequencer.state(), SequencerState::Arming { remaining: 5 });

        wait_for_state(&h.sequencer, SequencerState::AwaitingConfirmationCall).await;
        let calls = h.dispatcher.calls();
        assert!(matches!(&calls[0], Call::Sms { recipients, .. } if recipients == "+911234567890"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_arming_prevents_dispatch() {
        let h = harness(5, vec![contact("A", Some("+1"), None)]);
        h.sequencer.trigger();
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert!(matches!(h.sequencer.state(), SequencerState::Arming { .. }));

        h.sequencer.cancel();
        assert_eq!(h.sequencer.state(), SequencerState::Idle);

        // Well past the original countdown: nothing may fire.
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(h.sequencer.state(), SequencerState::Idle);
        assert!(h.dispatcher.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_is_noop_outside_arming() {
        let h = harness(0, vec![contact("A", Some("+1"), None)]);
        h.sequencer.cancel();
        assert_eq!(h.sequencer.state(), SequencerState::Idle);

        h.sequencer.trigger();
        wait_for_state(&h.sequencer, SequencerState::AwaitingConfirmationCall).await;
        h.sequencer.cancel();
        assert_eq!(h.sequencer.state(), SequencerState::AwaitingConfirmationCall);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_is_noop_unless_idle() {
        let h = harness(0, vec![contact("A", Some("+1"), None)]);
        h.sequencer.trigger();
        wait_for_state(&h.sequencer, SequencerState::AwaitingConfirmationCall).await;

        h.sequencer.trigger();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(h.sequencer.state(), SequencerState::AwaitingConfirmationCall);
        assert_eq!(h.dispatcher.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_contacts_lands_in_awaiting_call() {
        let h = harness(0, Vec::new());
        h.sequencer.trigger();
        wait_for_state(&h.sequencer, SequencerState::AwaitingConfirmationCall).await;
        assert!(h.dispatcher.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sms_precedes_email_in_dispatch_cycle() {
        let h = harness(0, vec![contact("A", Some("+1"), Some("a@example.com"))]);
        h.sequencer.trigger();
        wait_for_state(&h.sequencer, SequencerState::AwaitingConfirmationCall).await;

        let calls = h.dispatcher.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(&calls[0], Call::Sms { .. }));
        match &calls[1] {
            Call::Email { recipients, subject, .. } => {
                assert_eq!(recipients, "a@example.com");
                assert_eq!(subject, "Emergency Alert");
            }
            other => panic!("expected email, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_contacts_without_phones_skip_sms() {
        let h = harness(0, vec![contact("A", None, Some("a@example.com"))]);
        h.sequencer.trigger();
        wait_for_state(&h.sequencer, SequencerState::AwaitingConfirmationCall).await;

        let calls = h.dispatcher.calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(&calls[0], Call::Email { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_location_failure_substitutes_placeholder() {
        let h = harness_with(
            0,
            vec![contact("A", Some("+1"), None)],
            OsFamily::Android,
            Arc::new(FailingLocation),
        );
        h.sequencer.trigger();
        wait_for_state(&h.sequencer, SequencerState::AwaitingConfirmationCall).await;

        match &h.dispatcher.calls()[0] {
            Call::Sms { body, .. } => assert!(body.contains("Location unavailable")),
            other => panic!("expected SMS, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_recipient_delimiter_follows_os_family() {
        let contacts =
            vec![contact("A", Some("+1"), None), contact("B", Some("+2"), None)];
        let h = harness_with(
            0,
            contacts.clone(),
            OsFamily::Android,
            Arc::new(FixedLocation::new(1.0, 2.0)),
        );
        h.sequencer.trigger();
        wait_for_state(&h.sequencer, SequencerState::AwaitingConfirmationCall).await;
        assert!(matches!(&h.dispatcher.calls()[0], Call::Sms { recipients, .. } if recipients == "+1;+2"));

        let h = harness_with(0, contacts, OsFamily::Other, Arc::new(FixedLocation::new(1.0, 2.0)));
        h.sequencer.trigger();
        wait_for_state(&h.sequencer, SequencerState::AwaitingConfirmationCall).await;
        assert!(matches!(&h.dispatcher.calls()[0], Call::Sms { recipients, .. } if recipients == "+1,+2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sms_intent_failure_still_reaches_awaiting_call() {
        let mut dispatcher = RecordingDispatcher::default();
        dispatcher.fail_sms = true;
        let dispatcher = Arc::new(dispatcher);
        let (notices, _rx) = create_notice_channel();
        let sequencer = AlertSequencer::new(
            Arc::new(MemorySettingsStore::new(AlertSettings::default())),
            Arc::new(MemoryContactStore::new(vec![contact("A", Some("+1"), None)])),
            Arc::new(FixedLocation::new(1.0, 2.0)),
            dispatcher.clone(),
            Arc::new(StaticProbe::new(OsFamily::Android)),
            notices,
        );
        sequencer.trigger();
        wait_for_state(&sequencer, SequencerState::AwaitingConfirmationCall).await;
        assert!(dispatcher.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirm_call_dials_and_returns_to_idle() {
        let h = harness(0, vec![contact("A", Some("+1"), None)]);
        h.sequencer.trigger();
        wait_for_state(&h.sequencer, SequencerState::AwaitingConfirmationCall).await;

        h.sequencer.confirm_call().await;
        assert_eq!(h.sequencer.state(), SequencerState::Idle);
        assert!(h.dispatcher.calls().contains(&Call::Dial("112".to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirm_call_uses_custom_number() {
        let h = harness(0, vec![contact("A", Some("+1"), None)]);
        let mut settings = AlertSettings::default();
        settings.custom_emergency_number = "5550123".to_string();
        h.settings.set(settings);

        h.sequencer.trigger();
        wait_for_state(&h.sequencer, SequencerState::AwaitingConfirmationCall).await;
        h.sequencer.confirm_call().await;
        assert!(h.dispatcher.calls().contains(&Call::Dial("5550123".to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirm_call_failure_still_ends_handshake() {
        let mut dispatcher = RecordingDispatcher::default();
        dispatcher.fail_dial = true;
        let dispatcher = Arc::new(dispatcher);
        let (notices, _rx) = create_notice_channel();
        let sequencer = AlertSequencer::new(
            Arc::new(MemorySettingsStore::new(AlertSettings::default())),
            Arc::new(MemoryContactStore::new(vec![contact("A", Some("+1"), None)])),
            Arc::new(FixedLocation::new(1.0, 2.0)),
            dispatcher,
            Arc::new(StaticProbe::new(OsFamily::Android)),
            notices,
        );
        sequencer.trigger();
        wait_for_state(&sequencer, SequencerState::AwaitingConfirmationCall).await;
        sequencer.confirm_call().await;
        assert_eq!(sequencer.state(), SequencerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quick_sms_without_numbers_sends_nothing() {
        let h = harness(0, vec![contact("A", None, Some("a@example.com"))]);
        h.sequencer.quick_sms().await;
        assert!(h.dispatcher.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_quick_email_copies_body_before_opening() {
        let h = harness(0, vec![contact("A", None, Some("a@example.com"))]);
        h.sequencer.quick_email().await;

        let calls = h.dispatcher.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(&calls[0], Call::Clipboard(text) if text.contains("EMERGENCY ALERT")));
        assert!(matches!(&calls[1], Call::Email { .. }));
        // Quick actions never touch the state machine.
        assert_eq!(h.sequencer.state(), SequencerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quick_copy_location() {
        let h = harness(0, Vec::new());
        h.sequencer.quick_copy_location().await;
        assert_eq!(
            h.dispatcher.calls(),
            vec![Call::Clipboard("https://maps.google.com/?q=1.5,2.5".to_string())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_quick_copy_location_failure_copies_nothing() {
        let h = harness_with(0, Vec::new(), OsFamily::Android, Arc::new(FailingLocation));
        h.sequencer.quick_copy_location().await;
        assert!(h.dispatcher.calls().is_empty());
    }
}
