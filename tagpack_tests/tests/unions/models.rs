use anyhow::Result;
use std::io::Write;
use tagpack_union::schema::{Args, CaseDescriptor, FieldRef, FieldType, UnionSchema, UnionType};
use tagpack_union::{Codec, KeyMode, ReadSeek, Resolver, UnknownTagPolicy};
use tagpack_wire::serde::{deser_f32, Ser, WriteLen};

fn no_fields<T>(_: &T) -> Vec<FieldRef<'_>> {
    vec![]
}

/* Shape */

#[derive(PartialEq, Clone, Default, Debug)]
pub enum Shape {
    Circle {
        radius: f64,
    },
    Rect {
        w: f64,
        h: f64,
    },
    Text {
        body: String,
        size: u16,
        bold: bool,
    },
    #[default]
    Empty,
}

impl UnionType for Shape {
    fn describe() -> UnionSchema<Self> {
        fn tag_of(s: &Shape) -> i32 {
            match s {
                Shape::Circle { .. } => 0,
                Shape::Rect { .. } => 1,
                Shape::Text { .. } => 2,
                Shape::Empty => 3,
            }
        }
        fn circle_fields(s: &Shape) -> Vec<FieldRef<'_>> {
            match s {
                Shape::Circle { radius } => vec![radius.into()],
                _ => vec![],
            }
        }
        fn rect_fields(s: &Shape) -> Vec<FieldRef<'_>> {
            match s {
                Shape::Rect { w, h } => vec![w.into(), h.into()],
                _ => vec![],
            }
        }
        fn text_fields(s: &Shape) -> Vec<FieldRef<'_>> {
            match s {
                Shape::Text { body, size, bold } => vec![body.into(), size.into(), bold.into()],
                _ => vec![],
            }
        }

        UnionSchema::new(tag_of)
            .named("Shape")
            .unknown_tag(UnknownTagPolicy::Skip)
            .case(
                CaseDescriptor::new(0, "Circle", circle_fields, |mut args| {
                    Ok(Shape::Circle {
                        radius: args.take(0)?,
                    })
                })
                .field("radius", FieldType::prim::<f64>()),
            )
            .case(
                CaseDescriptor::new(1, "Rect", rect_fields, |mut args| {
                    Ok(Shape::Rect {
                        w: args.take(0)?,
                        h: args.take(1)?,
                    })
                })
                .field("w", FieldType::prim::<f64>())
                .field("h", FieldType::prim::<f64>()),
            )
            .case(
                CaseDescriptor::new(2, "Text", text_fields, |mut args| {
                    Ok(Shape::Text {
                        body: args.take(0)?,
                        size: args.take(1)?,
                        bold: args.take(2)?,
                    })
                })
                .field("body", FieldType::prim::<String>())
                .field("size", FieldType::prim::<u16>())
                .field("bold", FieldType::prim::<bool>()),
            )
            .case(CaseDescriptor::new(3, "Empty", no_fields, |_| Ok(Shape::Empty)))
    }
}

/* Drawing: nested unions */

#[derive(PartialEq, Clone, Default, Debug)]
pub enum Drawing {
    Single {
        shape: Shape,
    },
    Layered {
        top: Option<Shape>,
        bottom: Shape,
        note: String,
    },
    #[default]
    Blank,
}

impl UnionType for Drawing {
    fn describe() -> UnionSchema<Self> {
        fn tag_of(d: &Drawing) -> i32 {
            match d {
                Drawing::Single { .. } => 10,
                Drawing::Layered { .. } => 20,
                Drawing::Blank => 30,
            }
        }
        fn single_fields(d: &Drawing) -> Vec<FieldRef<'_>> {
            match d {
                Drawing::Single { shape } => vec![FieldRef::nested(shape)],
                _ => vec![],
            }
        }
        fn layered_fields(d: &Drawing) -> Vec<FieldRef<'_>> {
            match d {
                Drawing::Layered { top, bottom, note } => {
                    vec![FieldRef::nested(top), FieldRef::nested(bottom), note.into()]
                }
                _ => vec![],
            }
        }

        UnionSchema::new(tag_of)
            .named("Drawing")
            .case(
                CaseDescriptor::new(10, "Single", single_fields, |mut args| {
                    Ok(Drawing::Single {
                        shape: args.take_nested(0)?,
                    })
                })
                .field("shape", FieldType::nested::<Shape>()),
            )
            .case(
                CaseDescriptor::new(20, "Layered", layered_fields, |mut args| {
                    Ok(Drawing::Layered {
                        top: args.take_nested(0)?,
                        bottom: args.take_nested(1)?,
                        note: args.take(2)?,
                    })
                })
                .field("top", FieldType::nested::<Option<Shape>>())
                .field("bottom", FieldType::nested::<Shape>())
                .field("note", FieldType::prim::<String>()),
            )
            .case(CaseDescriptor::new(30, "Blank", no_fields, |_| Ok(Drawing::Blank)))
    }
}

/// One resolver per key mode, each knowing `Shape` and `Drawing`.
pub fn resolvers() -> [(KeyMode, Resolver); 2] {
    [
        (
            KeyMode::Name,
            Resolver::builder()
                .union::<Shape>()
                .union::<Drawing>()
                .build(),
        ),
        (
            KeyMode::Index,
            Resolver::builder()
                .union_with::<Shape>(|| Shape::describe().keys(KeyMode::Index))
                .union_with::<Drawing>(|| Drawing::describe().keys(KeyMode::Index))
                .build(),
        ),
    ]
}

pub fn sample_shapes() -> Vec<Shape> {
    vec![
        Shape::Circle { radius: 2.5 },
        Shape::Rect { w: -1.0, h: 1e-9 },
        Shape::Text {
            body: String::from("tagpack"),
            size: 300,
            bold: true,
        },
        Shape::Text {
            body: "é".repeat(100),
            size: 0,
            bold: false,
        },
        Shape::Empty,
    ]
}

pub fn sample_drawings() -> Vec<Drawing> {
    let mut drawings = vec![Drawing::Blank];
    for shape in sample_shapes() {
        drawings.push(Drawing::Single {
            shape: shape.clone(),
        });
        drawings.push(Drawing::Layered {
            top: None,
            bottom: shape.clone(),
            note: String::new(),
        });
        drawings.push(Drawing::Layered {
            top: Some(shape),
            bottom: Shape::Empty,
            note: String::from("on top"),
        });
    }
    drawings
}

/* Person: reconstruction parameters in their own order */

#[derive(PartialEq, Clone, Default, Debug)]
pub enum Person {
    Known {
        name: String,
        age: u8,
    },
    #[default]
    Anonymous,
}

impl UnionType for Person {
    fn describe() -> UnionSchema<Self> {
        fn known_fields(p: &Person) -> Vec<FieldRef<'_>> {
            match p {
                Person::Known { name, age } => vec![name.into(), age.into()],
                Person::Anonymous => vec![],
            }
        }

        UnionSchema::new(|p: &Person| match p {
            Person::Known { .. } => 0,
            Person::Anonymous => 1,
        })
        .named("Person")
        .case(
            CaseDescriptor::new(0, "Known", known_fields, |mut args| {
                let age = args.take(0)?;
                let name = args.take(1)?;
                Ok(Person::Known { name, age })
            })
            .field("Name", FieldType::prim::<String>())
            .field("Age", FieldType::prim::<u8>())
            .param("age", FieldType::prim::<u8>())
            .param("NAME", FieldType::prim::<String>()),
        )
        .case(CaseDescriptor::new(1, "Anonymous", no_fields, |_| Ok(Person::Anonymous)))
    }
}

/* Reading: a field with a user-supplied codec */

#[derive(PartialEq, Clone, Copy, Default, Debug)]
pub struct Celsius(pub f32);

pub struct CelsiusCodec;

impl Codec<Celsius> for CelsiusCodec {
    fn encode(&self, value: &Celsius, w: &mut dyn Write, _: &Resolver) -> Result<WriteLen> {
        value.0.ser(w)
    }

    fn decode(&self, r: &mut dyn ReadSeek, _: &Resolver) -> Result<(usize, Celsius)> {
        let (r_len, f) = deser_f32(r)?;
        Ok((r_len, Celsius(f)))
    }
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum Reading {
    Temperature { at: u64, value: Celsius },
}

impl UnionType for Reading {
    fn describe() -> UnionSchema<Self> {
        fn fields(r: &Reading) -> Vec<FieldRef<'_>> {
            let Reading::Temperature { at, value } = r;
            vec![at.into(), FieldRef::nested(value)]
        }
        fn make(mut args: Args) -> Result<Reading> {
            Ok(Reading::Temperature {
                at: args.take(0)?,
                value: args.take_nested(1)?,
            })
        }

        UnionSchema::new(|_: &Reading| 0)
            .named("Reading")
            .keys(KeyMode::Index)
            .case(
                CaseDescriptor::new(0, "Temperature", fields, make)
                    .field("at", FieldType::prim::<u64>())
                    .field("value", FieldType::nested::<Celsius>()),
            )
    }
}

/* Event: two versions of one schema */

#[derive(PartialEq, Clone, Debug)]
pub enum EventV1 {
    Click { x: i32, y: i32 },
    Key { code: u32 },
}

#[derive(PartialEq, Clone, Debug)]
pub enum EventV2 {
    Click { x: i32, y: i32, button: u8 },
    Key { code: u32 },
    Scroll { delta: i16 },
}

impl UnionType for EventV1 {
    fn describe() -> UnionSchema<Self> {
        fn click_fields(e: &EventV1) -> Vec<FieldRef<'_>> {
            match e {
                EventV1::Click { x, y } => vec![x.into(), y.into()],
                _ => vec![],
            }
        }
        fn key_fields(e: &EventV1) -> Vec<FieldRef<'_>> {
            match e {
                EventV1::Key { code } => vec![code.into()],
                _ => vec![],
            }
        }

        UnionSchema::new(|e: &EventV1| match e {
            EventV1::Click { .. } => 0,
            EventV1::Key { .. } => 1,
        })
        .named("EventV1")
        .unknown_tag(UnknownTagPolicy::Skip)
        .case(
            CaseDescriptor::new(0, "Click", click_fields, |mut args| {
                Ok(EventV1::Click {
                    x: args.take(0)?,
                    y: args.take(1)?,
                })
            })
            .field("x", FieldType::prim::<i32>())
            .field("y", FieldType::prim::<i32>()),
        )
        .case(
            CaseDescriptor::new(1, "Key", key_fields, |mut args| {
                Ok(EventV1::Key {
                    code: args.take(0)?,
                })
            })
            .field("code", FieldType::prim::<u32>()),
        )
    }
}

impl UnionType for EventV2 {
    fn describe() -> UnionSchema<Self> {
        fn click_fields(e: &EventV2) -> Vec<FieldRef<'_>> {
            match e {
                EventV2::Click { x, y, button } => vec![x.into(), y.into(), button.into()],
                _ => vec![],
            }
        }
        fn key_fields(e: &EventV2) -> Vec<FieldRef<'_>> {
            match e {
                EventV2::Key { code } => vec![code.into()],
                _ => vec![],
            }
        }
        fn scroll_fields(e: &EventV2) -> Vec<FieldRef<'_>> {
            match e {
                EventV2::Scroll { delta } => vec![delta.into()],
                _ => vec![],
            }
        }

        UnionSchema::new(|e: &EventV2| match e {
            EventV2::Click { .. } => 0,
            EventV2::Key { .. } => 1,
            EventV2::Scroll { .. } => 2,
        })
        .named("EventV2")
        .unknown_tag(UnknownTagPolicy::Skip)
        .case(
            CaseDescriptor::new(0, "Click", click_fields, |mut args| {
                Ok(EventV2::Click {
                    x: args.take(0)?,
                    y: args.take(1)?,
                    button: args.take(2)?,
                })
            })
            .field("x", FieldType::prim::<i32>())
            .field("y", FieldType::prim::<i32>())
            .field("button", FieldType::prim::<u8>()),
        )
        .case(
            CaseDescriptor::new(1, "Key", key_fields, |mut args| {
                Ok(EventV2::Key {
                    code: args.take(0)?,
                })
            })
            .field("code", FieldType::prim::<u32>()),
        )
        .case(
            CaseDescriptor::new(2, "Scroll", scroll_fields, |mut args| {
                Ok(EventV2::Scroll {
                    delta: args.take(0)?,
                })
            })
            .field("delta", FieldType::prim::<i16>()),
        )
    }
}

pub fn event_resolvers() -> [(KeyMode, Resolver); 2] {
    [
        (
            KeyMode::Name,
            Resolver::builder()
                .union::<EventV1>()
                .union::<EventV2>()
                .build(),
        ),
        (
            KeyMode::Index,
            Resolver::builder()
                .union_with::<EventV1>(|| EventV1::describe().keys(KeyMode::Index))
                .union_with::<EventV2>(|| EventV2::describe().keys(KeyMode::Index))
                .build(),
        ),
    ]
}
