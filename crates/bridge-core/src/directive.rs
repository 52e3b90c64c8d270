//! Provider-facing signaling documents.
//!
//! The transfer directive is the XML body returned to the voice provider's
//! answer webhook. It instructs the provider to move the answered call's
//! media into the active session, authenticated by the participant's join
//! token. Generation is a pure function of the token and call id.

use crate::types::{CallId, JoinToken};

const SIP_TRANSFER_HOST: &str = "sip.webrtc.example.com:5060";

/// Build the transfer directive for an answered call. The document carries
/// the join token as UUI (user-to-user information) so the media platform can
/// place the call leg into the session as the bound participant.
pub fn transfer_document(token: &JoinToken, call_id: &CallId) -> String {
    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<Response>\n",
            "    <SipUri uui=\"{token};encoding=jwt\">",
            "sip:{call_id}@{host};transport=tls</SipUri>\n",
            "</Response>\n",
        ),
        token = escape_xml(token.expose()),
        call_id = escape_xml(&call_id.0),
        host = SIP_TRANSFER_HOST,
    )
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
