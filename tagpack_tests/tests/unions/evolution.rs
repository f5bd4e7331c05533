use super::models::{self, EventV1, EventV2};
use anyhow::Result;
use tagpack_union::FormatError;

/// Newer writers, older readers.
pub fn old_reader_ignores_additions() -> Result<()> {
    for (mode, resolver) in models::event_resolvers() {
        let buf = resolver.serialize(&EventV2::Click {
            x: -3,
            y: 4,
            button: 2,
        })?;
        assert_eq!(
            EventV1::Click { x: -3, y: 4 },
            resolver.deserialize::<EventV1>(&buf)?,
            "{mode:?}"
        );

        let buf = resolver.serialize(&EventV2::Key { code: 65 })?;
        assert_eq!(
            EventV1::Key { code: 65 },
            resolver.deserialize::<EventV1>(&buf)?,
            "{mode:?}"
        );

        let buf = resolver.serialize(&EventV2::Scroll { delta: -120 })?;
        assert_eq!(None, resolver.deserialize::<Option<EventV1>>(&buf)?, "{mode:?}");
        let err = resolver.deserialize::<EventV1>(&buf).unwrap_err();
        assert!(
            matches!(
                err.downcast_ref::<FormatError>(),
                Some(FormatError::UnknownTag { tag: 2, .. })
            ),
            "{mode:?} {err:#}"
        );
    }
    Ok(())
}

/// Older writers, newer readers.
pub fn new_reader_defaults_removals() -> Result<()> {
    for (mode, resolver) in models::event_resolvers() {
        let buf = resolver.serialize(&EventV1::Click { x: 10, y: 20 })?;
        assert_eq!(
            EventV2::Click {
                x: 10,
                y: 20,
                button: 0
            },
            resolver.deserialize::<EventV2>(&buf)?,
            "{mode:?}"
        );
    }
    Ok(())
}

/// A skipped envelope is consumed whole, so the next one still lines up.
pub fn unknown_tag_mid_stream() -> Result<()> {
    for (mode, resolver) in models::event_resolvers() {
        let written = vec![
            EventV2::Key { code: 1 },
            EventV2::Scroll { delta: 5 },
            EventV2::Click {
                x: 0,
                y: 0,
                button: 1,
            },
        ];
        let mut buf = vec![];
        for event in written.iter() {
            buf.extend(resolver.serialize(event)?);
        }

        let read = resolver
            .reader::<_, Option<EventV1>>(std::io::Cursor::new(&buf))?
            .map(|res| res.map(|(_, event)| event))
            .collect::<Result<Vec<_>>>()?;
        assert_eq!(
            vec![
                Some(EventV1::Key { code: 1 }),
                None,
                Some(EventV1::Click { x: 0, y: 0 }),
            ],
            read,
            "{mode:?}"
        );
    }
    Ok(())
}
