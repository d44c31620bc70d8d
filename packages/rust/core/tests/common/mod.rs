//! Fixture builders shared by the integration suites.
//!
//! The library never writes either source format, so the tests carry their
//! own snapshot encoder.

#![allow(dead_code)]

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use pagetree_core::PropertyValue;
use uuid::Uuid;

pub fn date(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, mi, s)
        .unwrap()
}

pub fn write_fixture(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).expect("fixture written");
    path
}

// ---------------------------------------------------------------------------
// Markup fixture
// ---------------------------------------------------------------------------

/// A small site tree mirroring the shapes a real markup export uses:
/// candidates are elements with `id` + `urlName`, properties are child
/// elements, one node overrides its slug, one declares a URL alias.
pub const MARKUP_EXPORT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<root id="-1">
  <SiteRoot id="1069" level="1" sortOrder="0" urlName="example-site" nodeName="Example Site" createDate="2014-12-12T13:23:29" updateDate="2016-09-01T16:45:19" creatorName="admin" writerName="james" template="1067">
    <Homepage id="1072" urlName="homepage" nodeName="Homepage" createDate="2014-12-15T10:01:20" updateDate="2016-08-30T10:16:30" creatorName="admin" writerName="fred" template="1067"></Homepage>
    <Content id="2552" urlName="content" nodeName="Content" createDate="2015-05-22T12:10:22" updateDate="2016-05-18T05:44:15" creatorName="sally" writerName="admin" template="1067">
      <stringField>This is a long string with special &lt; &gt; characters.</stringField>
      <boolFieldFalse>0</boolFieldFalse>
      <boolFieldTrue>1</boolFieldTrue>
      <intField>2048</intField>
      <dateField>2015-05-22T12:10:22</dateField>
      <xmlField><nodes><node>1</node><node>2</node><node>3</node></nodes></xmlField>
      <escapedString>Jack &amp; Jill</escapedString>
      <cdataString><![CDATA[Jack & Jill]]></cdataString>
      <cdataEscapedString><![CDATA[Jack &amp; Jill]]></cdataEscapedString>
      <emptyField></emptyField>
    </Content>
    <CategoryPage id="1239" urlName="news" nodeName="News" createDate="2015-03-25T13:42:15" updateDate="2016-03-01T05:39:24" creatorName="admin" writerName="admin" template="1067">
      <DateFolder id="2447" urlName="oct-2014" nodeName="Oct 2014" createDate="2015-05-13T12:10:32" updateDate="2015-05-13T12:10:32" creatorName="admin" writerName="admin" template="0">
        <Article id="2448" urlName="people-with-no-or-bad-credit-score" nodeName="People with No or Bad Credit Score" createDate="2015-05-13T12:10:33" updateDate="2015-10-22T07:42:08" creatorName="angela" writerName="admin" template="1067">
          <urlName>people-with-bad-credit-score</urlName>
        </Article>
        <Article id="2499" urlName="make-a-wise-decision-by-comparing-price-online" nodeName="Make a Wise Decision by Comparing Price Online" createDate="2015-05-15T10:30:43" updateDate="2015-06-18T16:38:31" creatorName="anish" writerName="anish" template="1067">
          <urlAlias>news/make-a-wise-decision</urlAlias>
        </Article>
      </DateFolder>
    </CategoryPage>
  </SiteRoot>
</root>
"#;

/// Same shape with one unparsable timestamp attribute.
pub const MARKUP_EXPORT_BAD_CREATEDATE: &str = r#"<root id="-1">
  <SiteRoot id="1069" urlName="example-site" nodeName="Example Site" createDate="2014-12-12T13:23:29" updateDate="2016-09-01T16:45:19" creatorName="admin" writerName="james" template="1067">
    <Homepage id="1072" urlName="homepage" nodeName="Homepage" createDate="2017-05-16T08:55:20.4171241+10:00" updateDate="2016-08-30T10:16:30" creatorName="admin" writerName="fred" template="1067"></Homepage>
  </SiteRoot>
</root>
"#;

// ---------------------------------------------------------------------------
// Snapshot encoder
// ---------------------------------------------------------------------------

const TICKS_PER_SECOND: i64 = 10_000_000;

fn tick_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn ticks_of(dt: NaiveDateTime) -> i64 {
    let delta = dt - tick_epoch();
    delta.num_seconds() * TICKS_PER_SECOND + i64::from(delta.subsec_nanos()) / 100
}

fn w_varint(out: &mut Vec<u8>, mut value: usize) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
}

fn w_string(out: &mut Vec<u8>, s: &str) {
    w_varint(out, s.len());
    out.extend_from_slice(s.as_bytes());
}

fn w_i32(out: &mut Vec<u8>, v: i32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn w_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn w_i64(out: &mut Vec<u8>, v: i64) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn w_bool(out: &mut Vec<u8>, v: bool) {
    out.push(u8::from(v));
}

fn w_uuid(out: &mut Vec<u8>, uid: &str) {
    let uid = Uuid::parse_str(uid).expect("valid fixture uuid");
    out.extend_from_slice(&uid.to_bytes_le());
}

fn w_datetime(out: &mut Vec<u8>, dt: NaiveDateTime) {
    w_i64(out, ticks_of(dt));
    out.push(1); // kind: UTC
}

fn w_value(out: &mut Vec<u8>, value: &PropertyValue) {
    match value {
        PropertyValue::Null => out.push(b'N'),
        PropertyValue::Text(s) => {
            out.push(b'S');
            w_string(out, s);
        }
        PropertyValue::Int(v) => {
            out.push(b'I');
            w_i32(out, *v);
        }
        PropertyValue::Long(v) => {
            out.push(b'L');
            w_i64(out, *v);
        }
        PropertyValue::Float(v) => {
            out.push(b'F');
            out.extend_from_slice(&v.to_le_bytes());
        }
        PropertyValue::Double(v) => {
            out.push(b'B');
            out.extend_from_slice(&v.to_le_bytes());
        }
        PropertyValue::Date(dt) => {
            out.push(b'D');
            w_datetime(out, *dt);
        }
    }
}

/// One content-data record (draft or published variant).
pub struct DataSpec {
    pub published: bool,
    pub name: String,
    pub segment: String,
    pub version_date: NaiveDateTime,
    pub writer_id: i32,
    pub template_id: i32,
    pub props: Vec<(String, Vec<PropertyValue>)>,
    pub cultures: Vec<(String, Option<String>, Option<String>, NaiveDateTime)>,
}

impl DataSpec {
    pub fn new(name: &str, segment: &str, version_date: NaiveDateTime) -> Self {
        Self {
            published: true,
            name: name.to_string(),
            segment: segment.to_string(),
            version_date,
            writer_id: -1,
            template_id: 1076,
            props: Vec::new(),
            cultures: Vec::new(),
        }
    }

    pub fn prop(mut self, key: &str, value: PropertyValue) -> Self {
        self.props.push((key.to_string(), vec![value]));
        self
    }

    pub fn template(mut self, template_id: i32) -> Self {
        self.template_id = template_id;
        self
    }

    pub fn culture(
        mut self,
        key: &str,
        name: Option<&str>,
        segment: Option<&str>,
        dt: NaiveDateTime,
    ) -> Self {
        self.cultures.push((
            key.to_string(),
            name.map(str::to_string),
            segment.map(str::to_string),
            dt,
        ));
        self
    }
}

fn encode_data(out: &mut Vec<u8>, data: &DataSpec) {
    w_bool(out, data.published);
    w_string(out, &data.name);
    w_string(out, &data.segment);
    w_i32(out, 3); // version id
    w_datetime(out, data.version_date);
    w_i32(out, data.writer_id);
    w_i32(out, data.template_id);
    w_i32(out, data.props.len() as i32);
    for (key, values) in &data.props {
        w_string(out, key);
        w_i32(out, values.len() as i32);
        for value in values {
            w_value(out, value);
        }
    }
    w_i32(out, data.cultures.len() as i32);
    for (key, name, segment, dt) in &data.cultures {
        w_string(out, key);
        match name {
            Some(n) => {
                out.push(b'S');
                w_string(out, n);
            }
            None => out.push(b'N'),
        }
        match segment {
            Some(s) => {
                out.push(b'S');
                w_string(out, s);
            }
            None => out.push(b'N'),
        }
        w_datetime(out, *dt);
    }
}

/// One full node kit: identity record plus up to two content variants.
pub struct KitSpec {
    pub id: i32,
    pub uid: String,
    pub level: i32,
    pub path: String,
    pub create_date: NaiveDateTime,
    pub creator_id: i32,
    pub content_type_id: i32,
    pub draft: Option<DataSpec>,
    pub published: Option<DataSpec>,
}

pub fn encode_kit(kit: &KitSpec) -> Vec<u8> {
    let mut out = Vec::new();
    w_i32(&mut out, kit.id);
    w_uuid(&mut out, &kit.uid);
    w_i32(&mut out, kit.level);
    w_string(&mut out, &kit.path);
    w_i32(&mut out, 0); // sort order
    w_i32(&mut out, kit.path_parent());
    w_datetime(&mut out, kit.create_date);
    w_i32(&mut out, kit.creator_id);
    w_i32(&mut out, kit.content_type_id);
    w_bool(&mut out, kit.draft.is_some());
    if let Some(draft) = &kit.draft {
        encode_data(&mut out, draft);
    }
    w_bool(&mut out, kit.published.is_some());
    if let Some(published) = &kit.published {
        encode_data(&mut out, published);
    }
    out
}

impl KitSpec {
    fn path_parent(&self) -> i32 {
        let mut ids: Vec<i32> = self
            .path
            .split(',')
            .map(|p| p.parse().expect("fixture path entry"))
            .collect();
        ids.pop();
        ids.pop().unwrap_or(-1)
    }
}

pub fn frame(out: &mut Vec<u8>, id: i32, payload: &[u8]) {
    w_i32(out, id);
    w_u32(out, payload.len() as u32);
    out.extend_from_slice(payload);
}

// ---------------------------------------------------------------------------
// Snapshot fixture
// ---------------------------------------------------------------------------

fn kit(id: i32, uid: &str, path: &str, content_type_id: i32, published: DataSpec) -> KitSpec {
    KitSpec {
        id,
        uid: uid.to_string(),
        level: path.split(',').count() as i32 - 1,
        path: path.to_string(),
        create_date: date(2019, 6, 25, 8, 4, 16),
        creator_id: -1,
        content_type_id,
        draft: None,
        published: Some(published),
    }
}

/// A small site tree in snapshot form, keys ascending. Includes a draft-only
/// node, a URL-alias node, typed properties and a culture variant.
pub fn site_snapshot() -> Vec<u8> {
    let text = |s: &str| PropertyValue::Text(s.to_string());

    let kits = vec![
        kit(
            1095,
            "ca4249ed-2b23-4337-b522-63cabe5587d1",
            "-1,1095",
            1089,
            DataSpec::new("Home", "home", date(2019, 6, 25, 14, 5, 34))
                .prop("heroCTACaption", text("Check our products"))
                .culture("en-US", Some("Home"), None, date(2019, 6, 25, 14, 5, 34)),
        ),
        kit(
            1096,
            "ec4aafcc-0c25-4f25-a8fe-705bfae1d324",
            "-1,1095,1096",
            1085,
            DataSpec::new("Products", "products", date(2019, 6, 25, 8, 4, 17)).template(1081),
        ),
        kit(
            1097,
            "df1eb830-411b-4d41-a343-3917b76d533c",
            "-1,1095,1096,1097",
            1086,
            DataSpec::new("Tattoo", "tattoo", date(2019, 6, 25, 8, 4, 17)).template(1080),
        ),
        kit(
            1105,
            "00000000-0000-0000-0000-000000001105",
            "-1,1095,1105",
            1090,
            DataSpec::new("People", "people", date(2019, 6, 25, 8, 4, 17))
                .prop("navHide", PropertyValue::Int(0)),
        ),
        kit(
            1106,
            "00000000-0000-0000-0000-000000001106",
            "-1,1095,1105,1106",
            1091,
            DataSpec::new("Jan Skovgaard", "jan-skovgaard", date(2019, 6, 25, 8, 4, 17))
                .prop("navHide", PropertyValue::Int(1)),
        ),
        kit(
            1114,
            "00000000-0000-0000-0000-000000001114",
            "-1,1095,1114",
            1092,
            DataSpec::new("Blog", "blog", date(2019, 6, 25, 8, 4, 17))
                .prop("pageTitle", text("Behind The Scenes"))
                .prop("keywords", text("[]"))
                .prop("navHide", PropertyValue::Int(0))
                .prop("postsPerPage", text("2"))
                .prop(
                    "xmlField",
                    text("<blocks><block>1</block><block>2</block></blocks>"),
                ),
        ),
        kit(
            1117,
            "00000000-0000-0000-0000-000000001117",
            "-1,1095,1114,1117",
            1093,
            DataSpec::new("This will be great", "this-will-be-great", date(2019, 6, 25, 8, 4, 17))
                .prop("publishedDate", PropertyValue::Date(date(2019, 10, 19, 13, 15, 0))),
        ),
        {
            let mut draft = DataSpec::new("Contact", "contact", date(2019, 7, 1, 9, 30, 45));
            draft.published = false;
            draft.writer_id = 4;
            KitSpec {
                id: 1118,
                uid: "00000000-0000-0000-0000-000000001118".to_string(),
                level: 2,
                path: "-1,1095,1118".to_string(),
                create_date: date(2019, 6, 25, 8, 4, 16),
                creator_id: -1,
                content_type_id: 1094,
                draft: Some(draft),
                published: None,
            }
        },
        kit(
            1120,
            "00000000-0000-0000-0000-000000001120",
            "-1,1095,1120",
            1094,
            DataSpec::new("Promo", "promo-page", date(2019, 6, 25, 8, 4, 17))
                .prop("urlAlias", text("promo/special,other")),
        ),
    ];

    let mut out = Vec::new();
    for k in &kits {
        frame(&mut out, k.id, &encode_kit(k));
    }
    out
}
