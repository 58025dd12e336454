use crate::net::NodeId;
use crate::report::{ReceivedRecord, ReportError, ResultWriter, escape_attr};
use crate::sim::SimTime;

use super::support::BrokenSink;

fn record(payload: &str, sender: Option<NodeId>) -> ReceivedRecord {
    ReceivedRecord {
        time: SimTime(2_208_000),
        receiver: NodeId(1),
        sender,
        bytes: u32::try_from(payload.len() + 1).expect("small payload"),
        payload: payload.to_string(),
    }
}

fn text(w: ResultWriter<Vec<u8>>) -> String {
    String::from_utf8(w.into_inner()).expect("utf8 output")
}

#[test]
fn document_has_root_records_and_closing_tag() {
    let mut w = ResultWriter::new(Vec::new());
    w.open().expect("open");
    assert!(w.is_open());
    w.record(&record("hello", Some(NodeId(0)))).expect("record");
    w.record(&record("bye", None)).expect("record");
    w.close().expect("close");
    assert!(w.is_closed());
    assert_eq!(w.records_written(), 2);

    assert_eq!(
        text(w),
        concat!(
            "<simbeenet ver=\"1.0\" fileType=\"results\">\n",
            "<p Time=\"0.002208\" Rcvr=\"1\" Sndr=\"0\" bytes=\"6\" payload=\"hello\" />\n",
            "<p Time=\"0.002208\" Rcvr=\"1\" Sndr=\"-1\" bytes=\"4\" payload=\"bye\" />\n",
            "</simbeenet>\n",
        )
    );
}

#[test]
fn second_close_is_rejected_and_writes_nothing() {
    let mut w = ResultWriter::new(Vec::new());
    w.open().expect("open");
    w.close().expect("close");
    let before = w.get_ref().len();

    assert!(matches!(w.close(), Err(ReportError::AlreadyClosed)));
    assert_eq!(w.get_ref().len(), before);
    assert_eq!(text(w).matches("</simbeenet>").count(), 1);
}

#[test]
fn closing_an_unopened_document_still_yields_a_well_formed_one() {
    let mut w = ResultWriter::new(Vec::new());
    w.close().expect("close");
    assert_eq!(
        text(w),
        "<simbeenet ver=\"1.0\" fileType=\"results\">\n</simbeenet>\n"
    );
}

#[test]
fn records_need_an_open_document() {
    let mut w = ResultWriter::new(Vec::new());
    assert!(matches!(
        w.record(&record("early", None)),
        Err(ReportError::NotOpen)
    ));
    w.open().expect("open");
    assert!(matches!(w.open(), Err(ReportError::AlreadyOpen)));
    w.close().expect("close");
    assert!(matches!(
        w.record(&record("late", None)),
        Err(ReportError::AlreadyClosed)
    ));
    assert_eq!(w.records_written(), 0);
}

#[test]
fn payload_is_escaped_inside_the_attribute() {
    let rec = record(r#"<b>"fish" & 'chips'</b>"#, Some(NodeId(4)));
    assert_eq!(
        rec.to_element(),
        r#"<p Time="0.002208" Rcvr="1" Sndr="4" bytes="24" payload="&lt;b&gt;&quot;fish&quot; &amp; &apos;chips&apos;&lt;/b&gt;" />"#
    );
    assert_eq!(escape_attr("tab\there\u{7}"), "tab&#9;here");
    assert_eq!(escape_attr("plain text"), "plain text");
}

#[test]
fn sink_failures_surface_as_io_errors() {
    let mut w = ResultWriter::new(BrokenSink);
    assert!(matches!(w.open(), Err(ReportError::Io(_))));
}
