use edjekit_archive::ResourceKind;
use edjekit_pick::{pick_run, PickError, PickRequest};
use tracing::info;

/// Flags of a pick request that take a value.
const VALUE_FLAGS: &[&str] = &[
    "-i", "--input", "-g", "--group", "-a", "--all", "-o", "--output", "--compression",
];

/// Removes `-v`/`--verbose` from pick tokens, where it would otherwise be taken for an unknown
/// pick flag. Values of other flags are left alone, so `-g -v` still names a group `-v`.
pub fn take_verbose(tokens: &mut Vec<String>) -> bool {
    let mut verbose = false;
    let mut expects_value = false;
    tokens.retain(|token| {
        if expects_value {
            expects_value = false;
            return true;
        }
        if token == "-v" || token == "--verbose" {
            verbose = true;
            return false;
        }
        expects_value = VALUE_FLAGS.contains(&token.as_str());
        true
    });
    verbose
}

pub fn pick(tokens: Vec<String>) -> anyhow::Result<()> {
    let request = PickRequest::parse(tokens).map_err(PickError::from)?;
    info!(
        inclusions = request.inclusions.len(),
        output = ?request.output,
        "Picking"
    );

    let report = pick_run(&request)?;
    if !report.written {
        println!("{} (not written)", report.output.display());
        println!("{:>8} groups", report.groups);
        for kind in ResourceKind::ALL {
            println!("{:>8} {}", report.resources(kind), kind.plural());
        }
        println!("{:>8} bytes", report.size);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::take_verbose;

    fn tokens(args: &str) -> Vec<String> {
        args.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn verbose_flags_are_taken_out_of_pick_tokens() {
        let mut args = tokens("-i a.edj -v -g Main --verbose -o out.edj");
        assert!(take_verbose(&mut args));
        assert_eq!(args, tokens("-i a.edj -g Main -o out.edj"));

        let mut args = tokens("-i a.edj -g -v -o out.edj");
        assert!(!take_verbose(&mut args));
        assert_eq!(args, tokens("-i a.edj -g -v -o out.edj"));
    }
}
