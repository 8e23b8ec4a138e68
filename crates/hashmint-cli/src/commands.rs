use anyhow::{anyhow, bail, Context as _};
use colored::Colorize;
use hashmint_codec::{CollectionConfig, CollectionMessage, ContentSet, MineRequest, RoyaltyParams};
use hashmint_collection::{
    expected_attempts, process, CollectionHandle, Context, Effect, OutboundMessage, Solver,
};
use hashmint_tree::BitTree;
use hashmint_types::Address;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};

use crate::cli::*;
use crate::config::DeployFile;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Init(args) => cmd_init(args),
        Command::Storage(args) => cmd_storage(args, &format),
        Command::Message(args) => cmd_message(args, &format),
        Command::Mine(args) => cmd_mine(args, &format),
        Command::Simulate(args) => cmd_simulate(args, &format),
    }
}

/// Build the inbound message an [`Operation`] describes.
pub fn build_message(op: &Operation) -> CollectionMessage {
    match op.clone() {
        Operation::ChangeOwner {
            new_owner,
            query_id,
        } => CollectionMessage::ChangeOwner {
            query_id,
            new_owner,
        },
        Operation::GetRoyaltyParams { query_id } => CollectionMessage::GetRoyaltyParams { query_id },
        Operation::EditContent {
            collection_content,
            common_content,
            factor,
            base,
            royalty_address,
            query_id,
        } => CollectionMessage::EditContent {
            query_id,
            content: ContentSet::new(collection_content, common_content),
            royalty: RoyaltyParams::new(factor, base, royalty_address),
        },
        Operation::Mine {
            expire,
            mint_to,
            data1,
            seed,
            data2,
            query_id,
        } => {
            let mut request = MineRequest::new(expire, mint_to, data1, seed).with_query_id(query_id);
            if let Some(data2) = data2 {
                request = request.with_secondary(data2);
            }
            CollectionMessage::Mine(request)
        }
        Operation::RescaleComplexity { expire, query_id } => {
            CollectionMessage::RescaleComplexity { query_id, expire }
        }
    }
}

fn tree_json(tree: &BitTree) -> Value {
    json!({
        "hash": tree.hash().to_hex(),
        "bit_len": tree.bits().len(),
        "bits": tree.bits().to_hex(),
        "children": tree.child_count(),
        "nodes": tree.node_count(),
    })
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_tree(label: &str, tree: &BitTree) {
    println!("  {label}: {}", tree.hash().to_hex().yellow());
    println!(
        "  Root: {} bits, {} children, {} nodes",
        tree.bits().len().to_string().bold(),
        tree.child_count(),
        tree.node_count()
    );
    println!("  Bits: {}", tree.bits().to_hex().dimmed());
}

fn load_deploy(path: &std::path::Path) -> anyhow::Result<(CollectionHandle, CollectionConfig)> {
    let file = DeployFile::load(path)?;
    let config = file.to_config()?;
    let handle = file.handle(&config)?;
    tracing::debug!(path = %path.display(), address = %handle.address(), "loaded deploy file");
    Ok((handle, config))
}

fn cmd_init(args: InitArgs) -> anyhow::Result<()> {
    if args.path.exists() && !args.force {
        bail!("{} already exists (use --force to overwrite)", args.path.display());
    }
    let mut file = DeployFile::default();
    file.owner = Address::ephemeral(file.chain_id);
    file.save(&args.path)?;
    println!(
        "{} Wrote deploy file {}",
        "✓".green().bold(),
        args.path.display().to_string().bold()
    );
    println!("  Owner: {}", file.owner.to_string().cyan());
    Ok(())
}

fn cmd_storage(args: StorageArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let (handle, config) = load_deploy(&args.deploy)?;
    let tree = config.encode().context("encoding collection state")?;
    match format {
        OutputFormat::Json => print_json(&json!({
            "address": handle.address().to_string(),
            "state": tree_json(&tree),
            "mining": config.mining,
        })),
        OutputFormat::Text => {
            println!("{} Encoded collection state", "✓".green().bold());
            println!("  Address: {}", handle.address().to_string().cyan());
            print_tree("State hash", &tree);
            Ok(())
        }
    }
}

fn cmd_message(args: MessageArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let message = build_message(&args.op);
    let body = message.encode().context("encoding message body")?;
    match format {
        OutputFormat::Json => print_json(&json!({
            "op": message.type_name(),
            "opcode": format!("{:#010x}", message.opcode()),
            "query_id": message.query_id(),
            "body": tree_json(&body),
        })),
        OutputFormat::Text => {
            println!(
                "{} {} ({:#010x})",
                "✓".green().bold(),
                message.type_name().bold(),
                message.opcode()
            );
            print_tree("Body hash", &body);
            Ok(())
        }
    }
}

fn cmd_mine(args: MineArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let (_, config) = load_deploy(&args.deploy)?;
    let mut rng = match args.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let expected = expected_attempts(&config.mining.threshold)
        .ok_or_else(|| anyhow!("threshold is zero; no body can be accepted"))?;
    tracing::info!(%expected, max_attempts = args.max_attempts, "searching for proof of work");

    let solution = Solver::new(args.mint_to, args.expire)
        .with_query_id(args.query_id)
        .with_max_attempts(args.max_attempts)
        .solve(&config.mining, &mut rng)
        .context("encoding mine body")?
        .ok_or_else(|| anyhow!("no solution within {} attempts", args.max_attempts))?;

    let data1 = hex::encode(solution.request.data1);
    match format {
        OutputFormat::Json => print_json(&json!({
            "attempts": solution.attempts,
            "expected_attempts": expected.to_string(),
            "data1": data1,
            "seed": solution.request.seed.to_string(),
            "body": tree_json(&solution.body),
        })),
        OutputFormat::Text => {
            println!(
                "{} Found solution after {} attempts (expected ~{})",
                "✓".green().bold(),
                solution.attempts.to_string().bold(),
                expected
            );
            println!("  data1: {}", data1.cyan());
            print_tree("Body hash", &solution.body);
            Ok(())
        }
    }
}

fn describe_effect(effect: &Effect) -> String {
    match effect {
        Effect::Minted { index, item, owner } => {
            format!("minted item #{index} at {item} for {owner}")
        }
        Effect::Rescaled {
            previous,
            threshold,
        } => format!(
            "threshold rescaled from 2^{} to 2^{}",
            previous.bits().saturating_sub(1),
            threshold.bits().saturating_sub(1)
        ),
        Effect::OwnerChanged { previous, owner } => format!("owner changed {previous} -> {owner}"),
        Effect::ContentEdited => "content and royalty replaced".to_string(),
        Effect::RoyaltyReported { to } => format!("royalty params sent to {to}"),
    }
}

fn outbound_json(message: &OutboundMessage) -> Value {
    match message {
        OutboundMessage::DeployItem {
            index,
            address,
            owner,
            state_init,
        } => json!({
            "kind": "deploy_item",
            "index": index,
            "address": address.to_string(),
            "owner": owner.to_string(),
            "state_init": tree_json(state_init),
        }),
        OutboundMessage::Reply { to, body } => json!({
            "kind": "reply",
            "to": to.to_string(),
            "body": tree_json(body),
        }),
    }
}

fn cmd_simulate(args: SimulateArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let (handle, config) = load_deploy(&args.deploy)?;
    let message = build_message(&args.op);
    let body = message.encode().context("encoding message body")?;
    let ctx = Context::new(args.now, args.sender);

    let transition = match process(&handle, &config, &ctx, &body) {
        Ok(transition) => transition,
        Err(err) => {
            let code = err.exit_code();
            match format {
                OutputFormat::Json => print_json(&json!({
                    "op": message.type_name(),
                    "exit_code": code,
                    "error": err.to_string(),
                }))?,
                OutputFormat::Text => {
                    println!(
                        "{} {} rejected: {}",
                        "✗".red().bold(),
                        message.type_name().bold(),
                        err
                    );
                }
            }
            bail!("operation rejected with exit code {code}");
        }
    };

    let state_tree = transition.state.encode().context("encoding new state")?;
    let outbound: Vec<Value> = transition.outbound.iter().map(outbound_json).collect();
    match format {
        OutputFormat::Json => print_json(&json!({
            "op": message.type_name(),
            "exit_code": 0,
            "effect": describe_effect(&transition.effect),
            "outbound": outbound,
            "next_item_index": transition.state.next_item_index,
            "owner": transition.state.owner.to_string(),
            "mining": transition.state.mining,
            "state": tree_json(&state_tree),
        })),
        OutputFormat::Text => {
            println!(
                "{} {} accepted: {}",
                "✓".green().bold(),
                message.type_name().bold(),
                describe_effect(&transition.effect)
            );
            for out in &transition.outbound {
                match out {
                    OutboundMessage::DeployItem { index, address, .. } => {
                        println!("  → deploy item #{index} at {}", address.to_string().cyan())
                    }
                    OutboundMessage::Reply { to, body } => println!(
                        "  → reply to {} ({})",
                        to.to_string().cyan(),
                        body.hash().short_hex()
                    ),
                }
            }
            println!("  Next item index: {}", transition.state.next_item_index);
            println!("  Seed: {:#x}", transition.state.mining.seed);
            print_tree("State hash", &state_tree);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mine_operation_defaults_secondary() {
        let message = build_message(&Operation::Mine {
            expire: 5,
            mint_to: Address::None,
            data1: [1; 32],
            seed: 3,
            data2: None,
            query_id: 0,
        });
        let CollectionMessage::Mine(request) = message else {
            panic!("expected mine");
        };
        assert_eq!(request.data2, [1; 32]);
    }

    #[test]
    fn rotated_seed_renders_as_json() {
        let mut file = DeployFile::default();
        file.mining.threshold = "2^255".into();
        let config = file.to_config().unwrap();
        let handle = file.handle(&config).unwrap();
        let miner = Address::std(0, [3; 32]);
        let solution = Solver::new(miner, 100)
            .solve(&config.mining, &mut StdRng::seed_from_u64(9))
            .unwrap()
            .unwrap();

        let transition = process(&handle, &config, &Context::new(50, miner), &solution.body).unwrap();
        let seed = transition.state.mining.seed;
        let value = json!({ "mining": transition.state.mining });
        assert_eq!(value["mining"]["seed"], Value::String(seed.to_string()));
    }

    #[test]
    fn describes_rescale_as_powers_of_two() {
        let effect = Effect::Rescaled {
            previous: hashmint_collection::threshold_for_exponent(240),
            threshold: hashmint_collection::threshold_for_exponent(241),
        };
        assert_eq!(describe_effect(&effect), "threshold rescaled from 2^240 to 2^241");
    }
}
