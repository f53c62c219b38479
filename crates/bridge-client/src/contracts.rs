//! ABI bindings of the contracts the test flows interact with, plus a thin handle to a deployed
//! token.

use std::{fs, path::Path, str::FromStr};

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, Bytes, U256},
    rpc::types::TransactionRequest,
    sol_types::SolCall,
};
use serde::Deserialize;

use crate::{
    errors::{ClientError, ClientResult},
    node::NodeClient,
};

#[allow(missing_docs)]
mod bindings {
    alloy::sol! {
        #[derive(Debug, PartialEq, Eq)]
        contract ERC20 {
            constructor(string name, string symbol);

            function approve(address spender, uint256 amount) external returns (bool);
            function mint(uint256 amount) external;
            function transfer(address to, uint256 amount) external returns (bool);
            function balanceOf(address account) external view returns (uint256);
            function allowance(address owner, address spender) external view returns (uint256);
        }

        #[derive(Debug, PartialEq, Eq)]
        contract Bridge {
            function bridge(
                address token,
                uint32 destinationNetwork,
                address destinationAddress,
                uint256 amount,
                bytes permitData
            ) external payable;

            function claim(
                bytes32[] smtProof,
                uint32 index,
                bytes32 mainnetExitRoot,
                bytes32 rollupExitRoot,
                uint32 originNetwork,
                address originTokenAddress,
                uint32 destinationNetwork,
                address destinationAddress,
                uint256 amount,
                bytes metadata
            ) external;
        }
    }
}

pub use bindings::{Bridge, ERC20};

/// Compiled contract artifact, as emitted by hardhat (`"bytecode": "0x.."`) or forge
/// (`"bytecode": { "object": "0x.." }`).
#[derive(Deserialize)]
struct Artifact {
    bytecode: ArtifactBytecode,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ArtifactBytecode {
    Hex(Bytes),
    Object { object: Bytes },
}

impl From<ArtifactBytecode> for Bytes {
    fn from(value: ArtifactBytecode) -> Self {
        match value {
            ArtifactBytecode::Hex(code) | ArtifactBytecode::Object { object: code } => code,
        }
    }
}

/// Reads contract creation bytecode from a JSON artifact or from a file holding bare hex.
pub fn load_creation_bytecode(path: impl AsRef<Path>) -> ClientResult<Bytes> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .map_err(|err| ClientError::Artifact(format!("{}: {err}", path.display())))?;
    let contents = contents.trim();

    let bytecode = if contents.starts_with('{') {
        serde_json::from_str::<Artifact>(contents)
            .map_err(|err| ClientError::Artifact(format!("{}: {err}", path.display())))?
            .bytecode
            .into()
    } else {
        Bytes::from_str(contents)
            .map_err(|err| ClientError::Artifact(format!("{}: {err}", path.display())))?
    };

    if bytecode.is_empty() {
        return Err(ClientError::Artifact(format!(
            "{}: empty creation bytecode",
            path.display()
        )));
    }

    Ok(bytecode)
}

/// Handle to a deployed ERC20 token.
#[derive(Debug, Clone)]
pub struct Erc20Instance {
    address: Address,
    node: NodeClient,
}

impl Erc20Instance {
    /// Creates a handle to the token at `address`.
    pub fn new(address: Address, node: NodeClient) -> Self {
        Self { address, node }
    }

    /// Address of the token contract.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Token balance of `owner`.
    pub async fn balance_of(&self, owner: Address) -> ClientResult<U256> {
        let ret = self.view(ERC20::balanceOfCall { account: owner }).await?;
        Ok(ret._0)
    }

    /// Amount `spender` may still move on behalf of `owner`.
    pub async fn allowance(&self, owner: Address, spender: Address) -> ClientResult<U256> {
        let ret = self.view(ERC20::allowanceCall { owner, spender }).await?;
        Ok(ret._0)
    }

    async fn view<C: SolCall>(&self, call: C) -> ClientResult<C::Return> {
        let tx = TransactionRequest::default()
            .with_to(self.address)
            .with_input(call.abi_encode());
        let out = self.node.call(&tx).await?;

        Ok(C::abi_decode_returns(&out, true)?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use alloy::sol_types::SolConstructor;

    use super::*;

    fn write_tmp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_hardhat_artifact() {
        let file =
            write_tmp(r#"{"contractName": "ERC20", "abi": [], "bytecode": "0x6080604052"}"#);

        let code = load_creation_bytecode(file.path()).expect("artifact should load");
        assert_eq!(&code[..], &[0x60, 0x80, 0x60, 0x40, 0x52]);
    }

    #[test]
    fn test_load_forge_artifact() {
        let file = write_tmp(
            r#"{"abi": [], "bytecode": {"object": "0x6080604052", "sourceMap": "", "linkReferences": {}}}"#,
        );

        let code = load_creation_bytecode(file.path()).expect("artifact should load");
        assert_eq!(code.len(), 5);
    }

    #[test]
    fn test_load_bare_hex() {
        let file = write_tmp("6080604052\n");

        let code = load_creation_bytecode(file.path()).expect("hex should load");
        assert_eq!(code.len(), 5);
    }

    #[test]
    fn test_load_rejects_empty_and_missing() {
        let file = write_tmp(r#"{"bytecode": "0x"}"#);
        assert!(matches!(
            load_creation_bytecode(file.path()),
            Err(ClientError::Artifact(_))
        ));

        assert!(matches!(
            load_creation_bytecode("/definitely/not/here.json"),
            Err(ClientError::Artifact(_))
        ));
    }

    #[test]
    fn test_selectors_match_deployed_contracts() {
        // well-known ERC20 selectors
        assert_eq!(ERC20::approveCall::SELECTOR, [0x09, 0x5e, 0xa7, 0xb3]);
        assert_eq!(ERC20::balanceOfCall::SELECTOR, [0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(ERC20::mintCall::SELECTOR, [0xa0, 0x71, 0x2d, 0x68]);
    }

    #[test]
    fn test_constructor_args_are_abi_encoded() {
        let args = ERC20::constructorCall {
            name: "Test Token".to_owned(),
            symbol: "TT".to_owned(),
        }
        .abi_encode();

        // two offsets followed by two length-prefixed strings
        assert_eq!(args.len(), 32 * 6);
        assert_eq!(U256::from_be_slice(&args[..32]), U256::from(0x40));
    }
}
